pub mod worker;

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobscout_service::SearchService;
use jobscout_storage::{Stores, db::Db};

#[derive(Debug, Parser)]
#[command(
	version = jobscout_cli::VERSION,
	rename_all = "kebab",
	styles = jobscout_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Run a single alert pass and exit, for cron-style scheduling.
	#[arg(long)]
	pub once: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = jobscout_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let stores = Stores::postgres(&db, config.search.full_text_enabled);
	let tick_interval = Duration::from_secs(config.alerts.tick_interval_secs);
	let service = SearchService::new(config, stores);
	let state = worker::WorkerState { service, tick_interval, once: args.once };

	worker::run_worker(state).await
}
