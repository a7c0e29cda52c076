use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

use jobscout_domain::{
	alerts::{self, AlertFrequency, MAX_JOBS_PER_NOTIFICATION},
	filters,
};
use jobscout_storage::models::SearchAlert;

use crate::{
	AlertNotification, JobSummary, RequesterContext, SearchService, ServiceError, ServiceResult,
	saved_searches::{identified, stored_filters},
	search::{rank_candidates, summarize},
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AlertCreateRequest {
	pub name: String,
	/// Copies the saved search's query and filters at creation time; the
	/// alert then lives independently of it.
	pub saved_search_id: Option<Uuid>,
	pub query: Option<String>,
	pub filters: Option<jobscout_domain::filters::SearchFilterInput>,
	pub frequency: AlertFrequency,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AlertUpdateRequest {
	pub alert_id: Uuid,
	pub name: Option<String>,
	pub query: Option<String>,
	pub filters: Option<jobscout_domain::filters::SearchFilterInput>,
	pub frequency: Option<AlertFrequency>,
	pub is_active: Option<bool>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AlertView {
	pub alert_id: Uuid,
	pub saved_search_id: Option<Uuid>,
	pub name: String,
	pub query: String,
	pub filters: serde_json::Value,
	pub frequency: String,
	pub is_active: bool,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub last_notified_at: Option<OffsetDateTime>,
	pub last_seen_job_id: Option<Uuid>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AlertsResponse {
	pub alerts: Vec<AlertView>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AlertToggleResponse {
	pub alert_id: Uuid,
	pub is_active: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProcessDueAlertsResponse {
	/// Due alerts the tick attempted, including ones that failed.
	pub processed: i64,
	pub notified: i64,
}

impl SearchService {
	pub async fn create_alert(
		&self,
		req: AlertCreateRequest,
		requester: &RequesterContext,
	) -> ServiceResult<AlertView> {
		let owner_id = identified(requester)?;
		let name = req.name.trim();

		if name.is_empty() {
			return Err(ServiceError::InvalidFilter {
				field: "name".to_string(),
				message: "name must be non-empty.".to_string(),
			});
		}

		let (query, filters_value) = match req.saved_search_id {
			Some(saved_search_id) => {
				let saved = self.stores.saved_searches.fetch(owner_id, saved_search_id).await?;
				let query = req.query.unwrap_or(saved.query);
				let filters_value = match &req.filters {
					Some(input) =>
						serde_json::to_value(input).unwrap_or(serde_json::Value::Null),
					None => saved.filters,
				};

				(query, filters_value)
			},
			None => {
				let query = req.query.unwrap_or_default();

				if query.trim().is_empty() {
					return Err(ServiceError::InvalidFilter {
						field: "query".to_string(),
						message: "Either query or saved_search_id is required.".to_string(),
					});
				}

				let input = req.filters.unwrap_or_default();

				(query, serde_json::to_value(&input).unwrap_or(serde_json::Value::Null))
			},
		};
		let input = stored_filters(&filters_value)?;

		filters::normalize(&query, &input, requester.capability.is_elevated())?;

		let now = OffsetDateTime::now_utc();
		let alert = SearchAlert {
			alert_id: Uuid::new_v4(),
			owner_id,
			saved_search_id: req.saved_search_id,
			name: name.to_string(),
			query: query.trim().to_string(),
			filters: filters_value,
			frequency: req.frequency.as_str().to_string(),
			is_active: true,
			last_notified_at: None,
			last_seen_job_id: None,
			created_at: now,
			updated_at: now,
		};
		let alert = self.stores.alerts.create(alert).await?;

		Ok(view(alert))
	}

	pub async fn list_alerts(&self, requester: &RequesterContext) -> ServiceResult<AlertsResponse> {
		let owner_id = identified(requester)?;
		let alerts = self.stores.alerts.list(owner_id).await?;

		Ok(AlertsResponse { alerts: alerts.into_iter().map(view).collect() })
	}

	pub async fn get_alert(
		&self,
		alert_id: Uuid,
		requester: &RequesterContext,
	) -> ServiceResult<AlertView> {
		let owner_id = identified(requester)?;
		let alert = self.stores.alerts.fetch(owner_id, alert_id).await?;

		Ok(view(alert))
	}

	/// Checkpoint fields are engine-owned; this only touches the caller
	/// visible settings.
	pub async fn update_alert(
		&self,
		req: AlertUpdateRequest,
		requester: &RequesterContext,
	) -> ServiceResult<AlertView> {
		let owner_id = identified(requester)?;
		let mut alert = self.stores.alerts.fetch(owner_id, req.alert_id).await?;

		if let Some(name) = req.name {
			let name = name.trim().to_string();

			if name.is_empty() {
				return Err(ServiceError::InvalidFilter {
					field: "name".to_string(),
					message: "name must be non-empty.".to_string(),
				});
			}

			alert.name = name;
		}
		if let Some(query) = req.query {
			alert.query = query.trim().to_string();
		}
		if let Some(input) = &req.filters {
			alert.filters = serde_json::to_value(input).unwrap_or(serde_json::Value::Null);
		}
		if let Some(frequency) = req.frequency {
			alert.frequency = frequency.as_str().to_string();
		}
		if let Some(is_active) = req.is_active {
			alert.is_active = is_active;
		}
		if alert.query.is_empty() && alert.saved_search_id.is_none() {
			return Err(ServiceError::InvalidFilter {
				field: "query".to_string(),
				message: "An alert without a linked saved search needs a query.".to_string(),
			});
		}

		let input = stored_filters(&alert.filters)?;

		filters::normalize(&alert.query, &input, requester.capability.is_elevated())?;

		alert.updated_at = OffsetDateTime::now_utc();

		let alert = self.stores.alerts.update(alert).await?;

		Ok(view(alert))
	}

	pub async fn delete_alert(
		&self,
		alert_id: Uuid,
		requester: &RequesterContext,
	) -> ServiceResult<()> {
		let owner_id = identified(requester)?;

		self.stores.alerts.delete(owner_id, alert_id).await?;

		Ok(())
	}

	pub async fn toggle_alert(
		&self,
		alert_id: Uuid,
		requester: &RequesterContext,
	) -> ServiceResult<AlertToggleResponse> {
		let owner_id = identified(requester)?;
		let now = OffsetDateTime::now_utc();
		let alert = self.stores.alerts.toggle(owner_id, alert_id, now).await?;

		Ok(AlertToggleResponse { alert_id: alert.alert_id, is_active: alert.is_active })
	}

	/// One scheduler tick: walk active alerts, run the due ones through
	/// the search pipeline, notify owners whose alerts found new jobs and
	/// advance those alerts' checkpoints. A failure on one alert is
	/// logged and never stops the rest of the batch.
	pub async fn process_due_alerts(
		&self,
		frequency: Option<AlertFrequency>,
	) -> ServiceResult<ProcessDueAlertsResponse> {
		let now = OffsetDateTime::now_utc();
		let batch = self.stores.alerts.active_alerts(frequency, self.cfg.alerts.batch_size).await?;
		let mut processed = 0;
		let mut notified = 0;

		for alert in batch {
			let Some(frequency) = AlertFrequency::parse(&alert.frequency) else {
				error!(
					alert_id = %alert.alert_id,
					frequency = %alert.frequency,
					"Skipping alert with unknown frequency.",
				);

				continue;
			};

			if !alerts::alert_due(frequency, alert.last_notified_at, now) {
				continue;
			}

			processed += 1;

			match self.process_alert(&alert, now).await {
				Ok(true) => notified += 1,
				Ok(false) => {},
				Err(err) => {
					error!(
						error = %err,
						alert_id = %alert.alert_id,
						alert_name = %alert.name,
						"Failed to process alert.",
					);
				},
			}
		}

		Ok(ProcessDueAlertsResponse { processed, notified })
	}

	/// Returns whether a notification went out. An empty new set leaves
	/// the checkpoint untouched, so a later tick can still catch jobs
	/// created just before this one.
	async fn process_alert(&self, alert: &SearchAlert, now: OffsetDateTime) -> ServiceResult<bool> {
		let input = stored_filters(&alert.filters)?;
		// Owner capability is not persisted on the alert, so the engine
		// searches at standard visibility: alerts only ever report active
		// jobs.
		let filters = filters::normalize(&alert.query, &input, false)?;
		let candidates = self.candidate_set(&filters).await?;
		let ranked = rank_candidates(candidates, &filters.query, self.rank_options(), now);
		let cutoff = alerts::new_since_cutoff(alert.last_notified_at, now);
		let new_jobs: Vec<_> = ranked
			.into_iter()
			.filter(|(candidate, _)| candidate.job.created_at > cutoff)
			.collect();

		if new_jobs.is_empty() {
			return Ok(false);
		}

		let total_count = new_jobs.len() as i64;
		let jobs: Vec<JobSummary> = new_jobs
			.into_iter()
			.take(MAX_JOBS_PER_NOTIFICATION)
			.map(|(candidate, boost)| summarize(candidate, boost))
			.collect();
		let top_job_id = jobs.first().map(|job| job.id);
		let notification = AlertNotification {
			alert_id: alert.alert_id,
			alert_name: alert.name.clone(),
			owner_id: alert.owner_id,
			total_count,
			jobs,
		};

		self.notifier.notify(&notification).await;
		self.stores.alerts.mark_notified(alert.alert_id, now, top_job_id).await?;

		Ok(true)
	}
}

fn view(alert: SearchAlert) -> AlertView {
	AlertView {
		alert_id: alert.alert_id,
		saved_search_id: alert.saved_search_id,
		name: alert.name,
		query: alert.query,
		filters: alert.filters,
		frequency: alert.frequency,
		is_active: alert.is_active,
		last_notified_at: alert.last_notified_at,
		last_seen_job_id: alert.last_seen_job_id,
		created_at: alert.created_at,
		updated_at: alert.updated_at,
	}
}
