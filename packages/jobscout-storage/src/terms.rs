use sqlx::QueryBuilder;
use time::OffsetDateTime;

use jobscout_domain::similarity::SIMILARITY_THRESHOLD;

use crate::{
	BoxFuture, Error, PgStore, Result, TermStore, models::PopularSearchTerm, store::like_pattern,
};

impl TermStore for PgStore {
	fn increment_term(&self, term: String, now: OffsetDateTime) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			// The upsert is the atomic fetch-and-add; a read-then-write
			// pair would drop concurrent increments.
			sqlx::query(
				"\
INSERT INTO popular_search_terms (term, search_count, first_seen_at, last_seen_at)
VALUES ($1, 1, $2, $2)
ON CONFLICT (term) DO UPDATE
SET
	search_count = popular_search_terms.search_count + 1,
	last_seen_at = EXCLUDED.last_seen_at",
			)
			.bind(term)
			.bind(now)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn terms_containing<'a>(
		&'a self,
		needle: &'a str,
		exclude_exact: Option<&'a str>,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<PopularSearchTerm>>> {
		Box::pin(async move {
			let mut builder =
				QueryBuilder::new("SELECT * FROM popular_search_terms WHERE term ILIKE ");

			builder.push_bind(like_pattern(needle));
			builder.push(" ESCAPE '\\'");

			if let Some(excluded) = exclude_exact {
				builder.push(" AND lower(term) <> lower(");
				builder.push_bind(excluded);
				builder.push(")");
			}

			builder.push(" ORDER BY search_count DESC, last_seen_at DESC LIMIT ");
			builder.push_bind(limit);

			Ok(builder.build_query_as::<PopularSearchTerm>().fetch_all(&self.pool).await?)
		})
	}

	fn terms_similar<'a>(
		&'a self,
		query: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<PopularSearchTerm>>> {
		Box::pin(async move {
			if !self.has_trigram_extension().await? {
				return Err(Error::Unsupported("pg_trgm"));
			}

			Ok(sqlx::query_as(
				"\
SELECT term, search_count, first_seen_at, last_seen_at
FROM popular_search_terms
WHERE similarity(term, $1) > $2 AND lower(term) <> lower($1)
ORDER BY similarity(term, $1) DESC, search_count DESC
LIMIT $3",
			)
			.bind(query)
			.bind(SIMILARITY_THRESHOLD as f32)
			.bind(limit)
			.fetch_all(&self.pool)
			.await?)
		})
	}
}
