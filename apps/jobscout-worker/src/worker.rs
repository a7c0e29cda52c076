use std::time::Duration;

use color_eyre::Result;
use tokio::time as tokio_time;

use jobscout_service::SearchService;

pub struct WorkerState {
	pub service: SearchService,
	pub tick_interval: Duration,
	pub once: bool,
}

/// Drives the alert engine. Passes run sequentially; the next sleep only
/// starts after the previous pass finished, so a slow pass delays the
/// schedule instead of overlapping it.
pub async fn run_worker(state: WorkerState) -> Result<()> {
	loop {
		match state.service.process_due_alerts(None).await {
			Ok(outcome) => {
				tracing::info!(
					processed = outcome.processed,
					notified = outcome.notified,
					"Alert pass finished.",
				);
			},
			Err(err) => {
				tracing::error!(error = %err, "Alert pass failed.");
			},
		}

		if state.once {
			return Ok(());
		}

		tokio_time::sleep(state.tick_interval).await;
	}
}
