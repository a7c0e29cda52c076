use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;
use uuid::Uuid;

use jobscout_domain::{alerts::AlertFrequency, filters::SearchFilterSet};

pub mod alerts;
pub mod db;
pub mod history;
pub mod jobs;
pub mod models;
pub mod saved_searches;
pub mod schema;
pub mod store;
pub mod terms;

mod error;

pub use error::Error;
pub use store::PgStore;

use models::{
	JobRecord, NewSearchEvent, PopularQuery, PopularSearchTerm, RankedJob, SavedSearch,
	SearchAlert, SearchHistoryEntry, SearchStatistics,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The job collection consumed by the search pipeline. Jobs are owned by
/// the wider platform; this subsystem only reads them.
pub trait JobStore
where
	Self: Send + Sync,
{
	fn supports_full_text(&self) -> BoxFuture<'_, Result<bool>>;
	/// Weighted full-text candidates, structural filters applied. Errors
	/// here are a capability problem, not a caller problem.
	fn search_full_text<'a>(
		&'a self,
		filters: &'a SearchFilterSet,
	) -> BoxFuture<'a, Result<Vec<RankedJob>>>;
	/// Substring-tier candidates. An empty query applies structural
	/// filters only.
	fn search_substring<'a>(
		&'a self,
		filters: &'a SearchFilterSet,
	) -> BoxFuture<'a, Result<Vec<JobRecord>>>;
	fn active_titles_containing<'a>(
		&'a self,
		needle: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<String>>>;
	fn active_locations_containing<'a>(
		&'a self,
		needle: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<String>>>;
}

pub trait HistoryStore
where
	Self: Send + Sync,
{
	fn append(&self, event: NewSearchEvent) -> BoxFuture<'_, Result<()>>;
	fn user_history(
		&self,
		user_id: Uuid,
		limit: i64,
	) -> BoxFuture<'_, Result<Vec<SearchHistoryEntry>>>;
	fn statistics(&self, since: OffsetDateTime) -> BoxFuture<'_, Result<SearchStatistics>>;
	fn popular_queries(
		&self,
		since: OffsetDateTime,
		limit: i64,
	) -> BoxFuture<'_, Result<Vec<PopularQuery>>>;
}

pub trait TermStore
where
	Self: Send + Sync,
{
	/// Atomic increment-or-insert. Must not lose updates under concurrent
	/// calls for the same term.
	fn increment_term(&self, term: String, now: OffsetDateTime) -> BoxFuture<'_, Result<()>>;
	fn terms_containing<'a>(
		&'a self,
		needle: &'a str,
		exclude_exact: Option<&'a str>,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<PopularSearchTerm>>>;
	/// Similarity-ranked terms, excluding an exact match of `query`.
	/// Returns [`Error::Unsupported`] when the backend has no similarity
	/// primitive.
	fn terms_similar<'a>(
		&'a self,
		query: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<PopularSearchTerm>>>;
}

pub trait SavedSearchStore
where
	Self: Send + Sync,
{
	fn create(&self, saved: SavedSearch) -> BoxFuture<'_, Result<SavedSearch>>;
	fn list(&self, owner_id: Uuid) -> BoxFuture<'_, Result<Vec<SavedSearch>>>;
	fn fetch(&self, owner_id: Uuid, saved_search_id: Uuid) -> BoxFuture<'_, Result<SavedSearch>>;
	fn update(&self, saved: SavedSearch) -> BoxFuture<'_, Result<SavedSearch>>;
	fn delete(&self, owner_id: Uuid, saved_search_id: Uuid) -> BoxFuture<'_, Result<()>>;
	fn touch_executed(
		&self,
		owner_id: Uuid,
		saved_search_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'_, Result<()>>;
}

pub trait AlertStore
where
	Self: Send + Sync,
{
	fn create(&self, alert: SearchAlert) -> BoxFuture<'_, Result<SearchAlert>>;
	fn list(&self, owner_id: Uuid) -> BoxFuture<'_, Result<Vec<SearchAlert>>>;
	fn fetch(&self, owner_id: Uuid, alert_id: Uuid) -> BoxFuture<'_, Result<SearchAlert>>;
	fn update(&self, alert: SearchAlert) -> BoxFuture<'_, Result<SearchAlert>>;
	fn delete(&self, owner_id: Uuid, alert_id: Uuid) -> BoxFuture<'_, Result<()>>;
	fn toggle(
		&self,
		owner_id: Uuid,
		alert_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'_, Result<SearchAlert>>;
	fn active_alerts(
		&self,
		frequency: Option<AlertFrequency>,
		limit: i64,
	) -> BoxFuture<'_, Result<Vec<SearchAlert>>>;
	/// Advances the alert checkpoint. Only the tick that found the alert
	/// due calls this.
	fn mark_notified(
		&self,
		alert_id: Uuid,
		now: OffsetDateTime,
		last_seen_job_id: Option<Uuid>,
	) -> BoxFuture<'_, Result<()>>;
}

/// The injected store bundle. Constructed once at startup and passed down
/// explicitly; there is no process-wide storage singleton.
#[derive(Clone)]
pub struct Stores {
	pub jobs: Arc<dyn JobStore>,
	pub history: Arc<dyn HistoryStore>,
	pub terms: Arc<dyn TermStore>,
	pub saved_searches: Arc<dyn SavedSearchStore>,
	pub alerts: Arc<dyn AlertStore>,
}

impl Stores {
	pub fn postgres(db: &db::Db, full_text_enabled: bool) -> Self {
		let store = Arc::new(PgStore::new(db.pool.clone(), full_text_enabled));

		Self {
			jobs: store.clone(),
			history: store.clone(),
			terms: store.clone(),
			saved_searches: store.clone(),
			alerts: store,
		}
	}
}
