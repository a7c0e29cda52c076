use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Result, schema};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &jobscout_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 6_221_503;
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in split_statements(&sql) {
			sqlx::query(&statement).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		// Extension statements run after the tables exist, outside the
		// transaction, and tolerate failure; creating pg_trgm needs
		// privileges some installs lack, and similarity lookups degrade
		// cleanly without it.
		for statement in split_statements(&schema::render_extensions()) {
			let _ = sqlx::query(&statement).execute(&self.pool).await;
		}

		Ok(())
	}
}

fn split_statements(sql: &str) -> Vec<String> {
	sql.split(';')
		.map(str::trim)
		.filter(|statement| !statement.is_empty())
		.map(str::to_string)
		.collect()
}
