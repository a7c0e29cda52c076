use time::{Duration, OffsetDateTime};

use crate::{RequesterContext, SearchService, ServiceError, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StatisticsResponse {
	pub total_searches: i64,
	pub unique_queries: i64,
	pub average_result_count: f64,
	pub distinct_searching_users: i64,
	pub window_days: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PopularTermEntry {
	pub term: String,
	pub count: i64,
	#[serde(with = "time::serde::rfc3339")]
	pub last_searched_at: OffsetDateTime,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PopularTermsResponse {
	pub terms: Vec<PopularTermEntry>,
}

impl SearchService {
	pub async fn statistics(
		&self,
		requester: &RequesterContext,
		window_days: Option<i64>,
	) -> ServiceResult<StatisticsResponse> {
		if !requester.capability.is_elevated() {
			return Err(ServiceError::Forbidden {
				message: "Statistics require elevated capability.".to_string(),
			});
		}

		let window_days = window_days.unwrap_or(self.cfg.analytics.statistics_window_days).max(1);
		let since = OffsetDateTime::now_utc() - Duration::days(window_days);
		let stats = self.stores.history.statistics(since).await?;

		Ok(StatisticsResponse {
			total_searches: stats.total_searches,
			unique_queries: stats.unique_queries,
			average_result_count: stats.average_result_count,
			distinct_searching_users: stats.distinct_searching_users,
			window_days,
		})
	}

	/// Windowed aggregation over search history, unlike autocomplete's
	/// all-time popularity counters.
	pub async fn popular_terms(
		&self,
		limit: i64,
		window_days: Option<i64>,
	) -> ServiceResult<PopularTermsResponse> {
		if limit <= 0 {
			return Ok(PopularTermsResponse { terms: Vec::new() });
		}

		let window_days =
			window_days.unwrap_or(self.cfg.analytics.popular_terms_window_days).max(1);
		let since = OffsetDateTime::now_utc() - Duration::days(window_days);
		let terms = self.stores.history.popular_queries(since, limit).await?;

		Ok(PopularTermsResponse {
			terms: terms
				.into_iter()
				.map(|term| PopularTermEntry {
					term: term.term,
					count: term.count,
					last_searched_at: term.last_searched_at,
				})
				.collect(),
		})
	}
}
