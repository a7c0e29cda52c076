pub mod alerts;
pub mod analytics;
pub mod history;
pub mod saved_searches;
pub mod search;
pub mod suggest;

use std::{future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

pub use alerts::{
	AlertCreateRequest, AlertToggleResponse, AlertUpdateRequest, AlertView, AlertsResponse,
	ProcessDueAlertsResponse,
};
pub use analytics::{PopularTermEntry, PopularTermsResponse, StatisticsResponse};
pub use history::{HistoryEntry, HistoryResponse};
pub use saved_searches::{
	ExecuteSavedSearchRequest, SavedSearchCreateRequest, SavedSearchUpdateRequest, SavedSearchView,
	SavedSearchesResponse,
};
pub use search::{JobSummary, SearchRequest, SearchResponse};
pub use suggest::{SimilarTermsResponse, SuggestionsResponse};

pub use jobscout_domain::alerts::AlertFrequency;

use jobscout_config::Config;
use jobscout_domain::filters::FilterError;
use jobscout_storage::Stores;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Visibility tier of a requester. Elevated callers (employer or admin
/// roles upstream) may filter on non-active job statuses; everyone else is
/// pinned to active listings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
	Standard,
	Elevated,
}

impl Capability {
	pub fn is_elevated(self) -> bool {
		matches!(self, Self::Elevated)
	}
}

#[derive(Clone, Debug)]
pub struct RequesterContext {
	pub user_id: Option<Uuid>,
	pub capability: Capability,
	pub client_ip: Option<String>,
}

impl RequesterContext {
	pub fn anonymous() -> Self {
		Self { user_id: None, capability: Capability::Standard, client_ip: None }
	}

	pub fn standard(user_id: Uuid) -> Self {
		Self { user_id: Some(user_id), capability: Capability::Standard, client_ip: None }
	}

	pub fn elevated(user_id: Uuid) -> Self {
		Self { user_id: Some(user_id), capability: Capability::Elevated, client_ip: None }
	}
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidFilter { field: String, message: String },
	NotFound { message: String },
	Forbidden { message: String },
	Conflict { message: String },
	Storage { message: String },
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidFilter { field, message } => {
				write!(f, "Invalid filter at {field}: {message}")
			},
			Self::NotFound { message } => write!(f, "Not found: {message}"),
			Self::Forbidden { message } => write!(f, "Forbidden: {message}"),
			Self::Conflict { message } => write!(f, "Conflict: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<jobscout_storage::Error> for ServiceError {
	fn from(err: jobscout_storage::Error) -> Self {
		match err {
			jobscout_storage::Error::NotFound(message) => Self::NotFound { message },
			jobscout_storage::Error::Conflict(message) => Self::Conflict { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}

impl From<FilterError> for ServiceError {
	fn from(err: FilterError) -> Self {
		Self::InvalidFilter { field: err.field().to_string(), message: err.to_string() }
	}
}

/// Payload handed to the notification collaborator when an alert has new
/// results. `total_count` counts the full new set; `jobs` carries at most
/// the top ten of it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AlertNotification {
	pub alert_id: Uuid,
	pub alert_name: String,
	pub owner_id: Uuid,
	pub total_count: i64,
	pub jobs: Vec<JobSummary>,
}

/// The external delivery seam. Delivery is fire-and-forget from this
/// subsystem's perspective; a real sender handles its own failures.
pub trait Notifier
where
	Self: Send + Sync,
{
	fn notify<'a>(&'a self, notification: &'a AlertNotification) -> BoxFuture<'a, ()>;
}

/// Default notifier: logs the payload instead of delivering it.
pub struct LogNotifier;

impl Notifier for LogNotifier {
	fn notify<'a>(&'a self, notification: &'a AlertNotification) -> BoxFuture<'a, ()> {
		Box::pin(async move {
			tracing::info!(
				alert_id = %notification.alert_id,
				owner_id = %notification.owner_id,
				alert_name = %notification.alert_name,
				total_count = notification.total_count,
				delivered = notification.jobs.len(),
				"Alert notification.",
			);
		})
	}
}

pub struct SearchService {
	pub cfg: Config,
	pub stores: Stores,
	pub notifier: Arc<dyn Notifier>,
}

impl SearchService {
	pub fn new(cfg: Config, stores: Stores) -> Self {
		Self { cfg, stores, notifier: Arc::new(LogNotifier) }
	}

	pub fn with_notifier(cfg: Config, stores: Stores, notifier: Arc<dyn Notifier>) -> Self {
		Self { cfg, stores, notifier }
	}

	pub(crate) fn rank_options(&self) -> jobscout_domain::ranking::RankOptions {
		jobscout_domain::ranking::RankOptions {
			boost_featured: self.cfg.search.boost_featured,
			boost_recent: self.cfg.search.boost_recent,
		}
	}

	pub(crate) fn clamp_limit(&self, limit: Option<i64>) -> i64 {
		limit.unwrap_or(self.cfg.search.default_limit).clamp(1, self.cfg.search.max_limit)
	}
}
