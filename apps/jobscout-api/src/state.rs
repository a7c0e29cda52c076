use std::sync::Arc;

use jobscout_service::SearchService;
use jobscout_storage::{Stores, db::Db};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SearchService>,
}

impl AppState {
	/// Connects to Postgres, applies the schema and wires up the service
	/// with the Postgres-backed stores.
	pub async fn connect(config: jobscout_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let stores = Stores::postgres(&db, config.search.full_text_enabled);

		Ok(Self::new(SearchService::new(config, stores)))
	}

	/// Wraps an already-wired service. Tests use this to run the routers
	/// against in-memory stores.
	pub fn new(service: SearchService) -> Self {
		Self { service: Arc::new(service) }
	}
}
