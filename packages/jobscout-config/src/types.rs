use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub alerts: Alerts,
	#[serde(default)]
	pub analytics: Analytics,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_limit: i64,
	pub max_limit: i64,
	pub full_text_enabled: bool,
	pub boost_featured: bool,
	pub boost_recent: bool,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_limit: 20,
			max_limit: 100,
			full_text_enabled: true,
			boost_featured: true,
			boost_recent: true,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Alerts {
	pub tick_interval_secs: u64,
	pub batch_size: i64,
}
impl Default for Alerts {
	fn default() -> Self {
		Self { tick_interval_secs: 60, batch_size: 100 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Analytics {
	pub statistics_window_days: i64,
	pub popular_terms_window_days: i64,
}
impl Default for Analytics {
	fn default() -> Self {
		Self { statistics_window_days: 30, popular_terms_window_days: 7 }
	}
}
