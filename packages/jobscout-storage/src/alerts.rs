use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use jobscout_domain::alerts::AlertFrequency;

use crate::{AlertStore, BoxFuture, Error, PgStore, Result, models::SearchAlert};

impl AlertStore for PgStore {
	fn create(&self, alert: SearchAlert) -> BoxFuture<'_, Result<SearchAlert>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO search_alerts (alert_id, owner_id, saved_search_id, name, query, filters, frequency, is_active, last_notified_at, last_seen_job_id, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
			)
			.bind(alert.alert_id)
			.bind(alert.owner_id)
			.bind(alert.saved_search_id)
			.bind(alert.name.as_str())
			.bind(alert.query.as_str())
			.bind(alert.filters.clone())
			.bind(alert.frequency.as_str())
			.bind(alert.is_active)
			.bind(alert.last_notified_at)
			.bind(alert.last_seen_job_id)
			.bind(alert.created_at)
			.bind(alert.updated_at)
			.execute(&self.pool)
			.await?;

			Ok(alert)
		})
	}

	fn list(&self, owner_id: Uuid) -> BoxFuture<'_, Result<Vec<SearchAlert>>> {
		Box::pin(async move {
			Ok(sqlx::query_as(
				"\
SELECT *
FROM search_alerts
WHERE owner_id = $1
ORDER BY created_at DESC, alert_id ASC",
			)
			.bind(owner_id)
			.fetch_all(&self.pool)
			.await?)
		})
	}

	fn fetch(&self, owner_id: Uuid, alert_id: Uuid) -> BoxFuture<'_, Result<SearchAlert>> {
		Box::pin(async move {
			sqlx::query_as("SELECT * FROM search_alerts WHERE owner_id = $1 AND alert_id = $2")
				.bind(owner_id)
				.bind(alert_id)
				.fetch_optional(&self.pool)
				.await?
				.ok_or_else(|| Error::NotFound(format!("Alert {alert_id} not found.")))
		})
	}

	fn update(&self, alert: SearchAlert) -> BoxFuture<'_, Result<SearchAlert>> {
		Box::pin(async move {
			let outcome = sqlx::query(
				"\
UPDATE search_alerts
SET name = $3, query = $4, filters = $5, frequency = $6, is_active = $7, updated_at = $8
WHERE owner_id = $1 AND alert_id = $2",
			)
			.bind(alert.owner_id)
			.bind(alert.alert_id)
			.bind(alert.name.as_str())
			.bind(alert.query.as_str())
			.bind(alert.filters.clone())
			.bind(alert.frequency.as_str())
			.bind(alert.is_active)
			.bind(alert.updated_at)
			.execute(&self.pool)
			.await?;

			if outcome.rows_affected() == 0 {
				return Err(Error::NotFound(format!("Alert {} not found.", alert.alert_id)));
			}

			Ok(alert)
		})
	}

	fn delete(&self, owner_id: Uuid, alert_id: Uuid) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let outcome =
				sqlx::query("DELETE FROM search_alerts WHERE owner_id = $1 AND alert_id = $2")
					.bind(owner_id)
					.bind(alert_id)
					.execute(&self.pool)
					.await?;

			if outcome.rows_affected() == 0 {
				return Err(Error::NotFound(format!("Alert {alert_id} not found.")));
			}

			Ok(())
		})
	}

	fn toggle(
		&self,
		owner_id: Uuid,
		alert_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'_, Result<SearchAlert>> {
		Box::pin(async move {
			sqlx::query_as(
				"\
UPDATE search_alerts
SET is_active = NOT is_active, updated_at = $3
WHERE owner_id = $1 AND alert_id = $2
RETURNING *",
			)
			.bind(owner_id)
			.bind(alert_id)
			.bind(now)
			.fetch_optional(&self.pool)
			.await?
			.ok_or_else(|| Error::NotFound(format!("Alert {alert_id} not found.")))
		})
	}

	fn active_alerts(
		&self,
		frequency: Option<AlertFrequency>,
		limit: i64,
	) -> BoxFuture<'_, Result<Vec<SearchAlert>>> {
		Box::pin(async move {
			let mut builder =
				QueryBuilder::new("SELECT * FROM search_alerts WHERE is_active = TRUE");

			if let Some(frequency) = frequency {
				builder.push(" AND frequency = ");
				builder.push_bind(frequency.as_str());
			}

			builder.push(" ORDER BY created_at ASC, alert_id ASC LIMIT ");
			builder.push_bind(limit);

			Ok(builder.build_query_as::<SearchAlert>().fetch_all(&self.pool).await?)
		})
	}

	fn mark_notified(
		&self,
		alert_id: Uuid,
		now: OffsetDateTime,
		last_seen_job_id: Option<Uuid>,
	) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
UPDATE search_alerts
SET last_notified_at = $2, last_seen_job_id = $3, updated_at = $2
WHERE alert_id = $1",
			)
			.bind(alert_id)
			.bind(now)
			.bind(last_seen_job_id)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}
}
