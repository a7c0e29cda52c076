use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	BoxFuture, HistoryStore, PgStore, Result,
	models::{NewSearchEvent, PopularQuery, SearchHistoryEntry, SearchStatistics},
};

impl HistoryStore for PgStore {
	fn append(&self, event: NewSearchEvent) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO search_history (history_id, user_id, query, filters, result_count, client_ip, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)",
			)
			.bind(Uuid::new_v4())
			.bind(event.user_id)
			.bind(event.query)
			.bind(event.filters)
			.bind(event.result_count)
			.bind(event.client_ip)
			.bind(event.created_at)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn user_history(
		&self,
		user_id: Uuid,
		limit: i64,
	) -> BoxFuture<'_, Result<Vec<SearchHistoryEntry>>> {
		Box::pin(async move {
			Ok(sqlx::query_as(
				"\
SELECT *
FROM search_history
WHERE user_id = $1
ORDER BY created_at DESC, history_id ASC
LIMIT $2",
			)
			.bind(user_id)
			.bind(limit)
			.fetch_all(&self.pool)
			.await?)
		})
	}

	fn statistics(&self, since: OffsetDateTime) -> BoxFuture<'_, Result<SearchStatistics>> {
		Box::pin(async move {
			Ok(sqlx::query_as::<_, SearchStatistics>(
				"\
SELECT
	COUNT(*) AS total_searches,
	COUNT(DISTINCT lower(trim(query))) AS unique_queries,
	COALESCE(AVG(result_count), 0)::float8 AS average_result_count,
	COUNT(DISTINCT user_id) AS distinct_searching_users
FROM search_history
WHERE created_at >= $1",
			)
			.bind(since)
			.fetch_one(&self.pool)
			.await?)
		})
	}

	fn popular_queries(
		&self,
		since: OffsetDateTime,
		limit: i64,
	) -> BoxFuture<'_, Result<Vec<PopularQuery>>> {
		Box::pin(async move {
			Ok(sqlx::query_as::<_, PopularQuery>(
				"\
SELECT lower(trim(query)) AS term, COUNT(*) AS count, MAX(created_at) AS last_searched_at
FROM search_history
WHERE created_at >= $1 AND char_length(trim(query)) >= 2
GROUP BY lower(trim(query))
ORDER BY count DESC, last_searched_at DESC
LIMIT $2",
			)
			.bind(since)
			.bind(limit)
			.fetch_all(&self.pool)
			.await?)
		})
	}
}
