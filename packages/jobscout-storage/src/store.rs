use sqlx::PgPool;

use crate::Result;

/// Postgres-backed implementation of every store trait. Cloneable because
/// the pool is.
#[derive(Clone)]
pub struct PgStore {
	pub(crate) pool: PgPool,
	pub(crate) full_text_enabled: bool,
}

impl PgStore {
	pub fn new(pool: PgPool, full_text_enabled: bool) -> Self {
		Self { pool, full_text_enabled }
	}

	pub(crate) async fn has_trigram_extension(&self) -> Result<bool> {
		let row: (bool,) =
			sqlx::query_as("SELECT EXISTS (SELECT 1 FROM pg_extension WHERE extname = 'pg_trgm')")
				.fetch_one(&self.pool)
				.await?;

		Ok(row.0)
	}
}

/// Escapes LIKE metacharacters so user input matches literally. Queries
/// using the result must specify `ESCAPE '\'`.
pub(crate) fn escape_like(input: &str) -> String {
	input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

pub(crate) fn like_pattern(input: &str) -> String {
	format!("%{}%", escape_like(input))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
	matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
