use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	BoxFuture, Error, PgStore, Result, SavedSearchStore, models::SavedSearch,
	store::is_unique_violation,
};

impl SavedSearchStore for PgStore {
	fn create(&self, saved: SavedSearch) -> BoxFuture<'_, Result<SavedSearch>> {
		Box::pin(async move {
			let result = sqlx::query(
				"\
INSERT INTO saved_searches (saved_search_id, owner_id, name, query, filters, is_active, created_at, updated_at, last_executed_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
			)
			.bind(saved.saved_search_id)
			.bind(saved.owner_id)
			.bind(saved.name.as_str())
			.bind(saved.query.as_str())
			.bind(saved.filters.clone())
			.bind(saved.is_active)
			.bind(saved.created_at)
			.bind(saved.updated_at)
			.bind(saved.last_executed_at)
			.execute(&self.pool)
			.await;

			match result {
				Ok(_) => Ok(saved),
				Err(err) if is_unique_violation(&err) => Err(Error::Conflict(format!(
					"Saved search named {:?} already exists.",
					saved.name
				))),
				Err(err) => Err(err.into()),
			}
		})
	}

	fn list(&self, owner_id: Uuid) -> BoxFuture<'_, Result<Vec<SavedSearch>>> {
		Box::pin(async move {
			Ok(sqlx::query_as(
				"\
SELECT *
FROM saved_searches
WHERE owner_id = $1
ORDER BY created_at DESC, saved_search_id ASC",
			)
			.bind(owner_id)
			.fetch_all(&self.pool)
			.await?)
		})
	}

	fn fetch(&self, owner_id: Uuid, saved_search_id: Uuid) -> BoxFuture<'_, Result<SavedSearch>> {
		Box::pin(async move {
			sqlx::query_as("SELECT * FROM saved_searches WHERE owner_id = $1 AND saved_search_id = $2")
				.bind(owner_id)
				.bind(saved_search_id)
				.fetch_optional(&self.pool)
				.await?
				.ok_or_else(|| Error::NotFound(format!("Saved search {saved_search_id} not found.")))
		})
	}

	fn update(&self, saved: SavedSearch) -> BoxFuture<'_, Result<SavedSearch>> {
		Box::pin(async move {
			let result = sqlx::query(
				"\
UPDATE saved_searches
SET name = $3, query = $4, filters = $5, is_active = $6, updated_at = $7
WHERE owner_id = $1 AND saved_search_id = $2",
			)
			.bind(saved.owner_id)
			.bind(saved.saved_search_id)
			.bind(saved.name.as_str())
			.bind(saved.query.as_str())
			.bind(saved.filters.clone())
			.bind(saved.is_active)
			.bind(saved.updated_at)
			.execute(&self.pool)
			.await;

			match result {
				Ok(outcome) if outcome.rows_affected() == 0 => Err(Error::NotFound(format!(
					"Saved search {} not found.",
					saved.saved_search_id
				))),
				Ok(_) => Ok(saved),
				Err(err) if is_unique_violation(&err) => Err(Error::Conflict(format!(
					"Saved search named {:?} already exists.",
					saved.name
				))),
				Err(err) => Err(err.into()),
			}
		})
	}

	fn delete(&self, owner_id: Uuid, saved_search_id: Uuid) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let outcome =
				sqlx::query("DELETE FROM saved_searches WHERE owner_id = $1 AND saved_search_id = $2")
					.bind(owner_id)
					.bind(saved_search_id)
					.execute(&self.pool)
					.await?;

			if outcome.rows_affected() == 0 {
				return Err(Error::NotFound(format!("Saved search {saved_search_id} not found.")));
			}

			Ok(())
		})
	}

	fn touch_executed(
		&self,
		owner_id: Uuid,
		saved_search_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let outcome = sqlx::query(
				"\
UPDATE saved_searches
SET last_executed_at = $3
WHERE owner_id = $1 AND saved_search_id = $2",
			)
			.bind(owner_id)
			.bind(saved_search_id)
			.bind(now)
			.execute(&self.pool)
			.await?;

			if outcome.rows_affected() == 0 {
				return Err(Error::NotFound(format!("Saved search {saved_search_id} not found.")));
			}

			Ok(())
		})
	}
}
