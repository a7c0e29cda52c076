use sqlx::{Postgres, QueryBuilder};

use jobscout_domain::filters::SearchFilterSet;

use crate::{
	BoxFuture, JobStore, PgStore, Result,
	models::{JobRecord, RankedJob},
	store::like_pattern,
};

/// Weighted document used for both matching and ranking. Title carries the
/// highest weight, description and requirements the middle band, location
/// the lowest. Must stay in sync with the expression index in
/// `sql/tables/001_jobs.sql`.
const WEIGHTED_DOCUMENT: &str = "\
setweight(to_tsvector('english', coalesce(title, '')), 'A') \
|| setweight(to_tsvector('english', coalesce(description, '')), 'B') \
|| setweight(to_tsvector('english', coalesce(requirements, '')), 'B') \
|| setweight(to_tsvector('english', coalesce(location, '')), 'D')";

fn push_structural_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &SearchFilterSet) {
	builder.push(" WHERE status = ");
	builder.push_bind(filters.status.as_str());

	if let Some(category_id) = filters.category_id {
		builder.push(" AND category_id = ");
		builder.push_bind(category_id);
	}
	if let Some(location) = &filters.location {
		builder.push(" AND location ILIKE ");
		builder.push_bind(like_pattern(location));
		builder.push(" ESCAPE '\\'");
	}
	if let Some(job_type) = filters.job_type {
		builder.push(" AND job_type = ");
		builder.push_bind(job_type.as_str());
	}
	if let Some(salary_min) = filters.salary_min {
		builder.push(" AND salary_min >= ");
		builder.push_bind(salary_min);
	}
	if let Some(salary_max) = filters.salary_max {
		builder.push(" AND salary_max <= ");
		builder.push_bind(salary_max);
	}
	if let Some(featured) = filters.featured {
		builder.push(" AND is_featured = ");
		builder.push_bind(featured);
	}
}

impl JobStore for PgStore {
	fn supports_full_text(&self) -> BoxFuture<'_, Result<bool>> {
		// tsvector support is built into Postgres; the switch exists so an
		// operator can force the substring tier.
		Box::pin(async move { Ok(self.full_text_enabled) })
	}

	fn search_full_text<'a>(
		&'a self,
		filters: &'a SearchFilterSet,
	) -> BoxFuture<'a, Result<Vec<RankedJob>>> {
		Box::pin(async move {
			let mut builder = QueryBuilder::new("SELECT *, ts_rank(");

			builder.push(WEIGHTED_DOCUMENT);
			builder.push(", websearch_to_tsquery('english', ");
			builder.push_bind(filters.query.as_str());
			builder.push("), 32)::float4 AS native_rank FROM jobs");
			push_structural_filters(&mut builder, filters);
			builder.push(" AND (");
			builder.push(WEIGHTED_DOCUMENT);
			builder.push(") @@ websearch_to_tsquery('english', ");
			builder.push_bind(filters.query.as_str());
			builder.push(") ORDER BY native_rank DESC, created_at DESC, job_id ASC");

			Ok(builder.build_query_as::<RankedJob>().fetch_all(&self.pool).await?)
		})
	}

	fn search_substring<'a>(
		&'a self,
		filters: &'a SearchFilterSet,
	) -> BoxFuture<'a, Result<Vec<JobRecord>>> {
		Box::pin(async move {
			let mut builder = QueryBuilder::new("SELECT * FROM jobs");

			push_structural_filters(&mut builder, filters);

			if filters.has_query() {
				let pattern = like_pattern(&filters.query);

				builder.push(" AND (title ILIKE ");
				builder.push_bind(pattern.clone());
				builder.push(" ESCAPE '\\' OR description ILIKE ");
				builder.push_bind(pattern.clone());
				builder.push(" ESCAPE '\\' OR requirements ILIKE ");
				builder.push_bind(pattern.clone());
				builder.push(" ESCAPE '\\' OR location ILIKE ");
				builder.push_bind(pattern);
				builder.push(" ESCAPE '\\')");
			}

			builder.push(" ORDER BY created_at DESC, job_id ASC");

			Ok(builder.build_query_as::<JobRecord>().fetch_all(&self.pool).await?)
		})
	}

	fn active_titles_containing<'a>(
		&'a self,
		needle: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			let rows: Vec<(String,)> = sqlx::query_as(
				"\
SELECT DISTINCT title
FROM jobs
WHERE status = 'active' AND title ILIKE $1 ESCAPE '\\'
ORDER BY title ASC
LIMIT $2",
			)
			.bind(like_pattern(needle))
			.bind(limit)
			.fetch_all(&self.pool)
			.await?;

			Ok(rows.into_iter().map(|(title,)| title).collect())
		})
	}

	fn active_locations_containing<'a>(
		&'a self,
		needle: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			let rows: Vec<(String,)> = sqlx::query_as(
				"\
SELECT DISTINCT location
FROM jobs
WHERE status = 'active' AND location <> '' AND location ILIKE $1 ESCAPE '\\'
ORDER BY location ASC
LIMIT $2",
			)
			.bind(like_pattern(needle))
			.bind(limit)
			.fetch_all(&self.pool)
			.await?;

			Ok(rows.into_iter().map(|(location,)| location).collect())
		})
	}
}
