use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct JobRecord {
	pub job_id: Uuid,
	pub title: String,
	pub description: String,
	pub requirements: String,
	pub location: String,
	pub category_id: Option<Uuid>,
	pub employer_id: Uuid,
	pub job_type: String,
	pub salary_min: Option<i64>,
	pub salary_max: Option<i64>,
	pub status: String,
	pub is_featured: bool,
	pub views_count: i64,
	pub created_at: OffsetDateTime,
}

/// A job plus the rank the backend computed for it, when the full-text
/// tier produced the candidate.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct RankedJob {
	#[sqlx(flatten)]
	pub job: JobRecord,
	pub native_rank: Option<f32>,
}

impl RankedJob {
	pub fn unranked(job: JobRecord) -> Self {
		Self { job, native_rank: None }
	}
}

/// One search invocation, as handed to the history store.
#[derive(Clone, Debug)]
pub struct NewSearchEvent {
	pub user_id: Option<Uuid>,
	pub query: String,
	pub filters: Value,
	pub result_count: i64,
	pub client_ip: Option<String>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SearchHistoryEntry {
	pub history_id: Uuid,
	pub user_id: Option<Uuid>,
	pub query: String,
	pub filters: Value,
	pub result_count: i64,
	pub client_ip: Option<String>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct PopularSearchTerm {
	pub term: String,
	pub search_count: i64,
	pub first_seen_at: OffsetDateTime,
	pub last_seen_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SavedSearch {
	pub saved_search_id: Uuid,
	pub owner_id: Uuid,
	pub name: String,
	pub query: String,
	pub filters: Value,
	pub is_active: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub last_executed_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SearchAlert {
	pub alert_id: Uuid,
	pub owner_id: Uuid,
	pub saved_search_id: Option<Uuid>,
	pub name: String,
	pub query: String,
	pub filters: Value,
	pub frequency: String,
	pub is_active: bool,
	pub last_notified_at: Option<OffsetDateTime>,
	pub last_seen_job_id: Option<Uuid>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SearchStatistics {
	pub total_searches: i64,
	pub unique_queries: i64,
	pub average_result_count: f64,
	pub distinct_searching_users: i64,
}

/// Windowed aggregation of history rows, as opposed to the all-time
/// counters in [`PopularSearchTerm`].
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct PopularQuery {
	pub term: String,
	pub count: i64,
	pub last_searched_at: OffsetDateTime,
}
