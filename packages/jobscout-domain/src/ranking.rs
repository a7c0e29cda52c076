use std::cmp::Ordering;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub const TITLE_MATCH_BOOST: i32 = 10;
pub const FEATURED_BOOST: i32 = 5;
pub const RECENT_BOOST: i32 = 3;
pub const RECENT_WINDOW: Duration = Duration::days(7);
pub const HIGH_VIEWS_BOOST: i32 = 2;
pub const HIGH_VIEWS_THRESHOLD: i64 = 100;
pub const WARM_VIEWS_BOOST: i32 = 1;
pub const WARM_VIEWS_THRESHOLD: i64 = 50;

#[derive(Clone, Copy, Debug)]
pub struct RankOptions {
	pub boost_featured: bool,
	pub boost_recent: bool,
}

impl Default for RankOptions {
	fn default() -> Self {
		Self { boost_featured: true, boost_recent: true }
	}
}

/// Composite relevance bonus for one record against a query.
///
/// The rules are additive and independent, except for the view-count pair
/// where only the higher matched threshold contributes. An empty query
/// never earns a boost.
pub fn relevance_boost(
	query: &str,
	title: &str,
	is_featured: bool,
	views_count: i64,
	created_at: OffsetDateTime,
	options: RankOptions,
	now: OffsetDateTime,
) -> i32 {
	let query = query.trim();

	if query.is_empty() {
		return 0;
	}

	let mut boost = 0;

	if title.to_lowercase().contains(&query.to_lowercase()) {
		boost += TITLE_MATCH_BOOST;
	}
	if is_featured && options.boost_featured {
		boost += FEATURED_BOOST;
	}
	if options.boost_recent && now - created_at <= RECENT_WINDOW {
		boost += RECENT_BOOST;
	}
	if views_count > HIGH_VIEWS_THRESHOLD {
		boost += HIGH_VIEWS_BOOST;
	} else if views_count > WARM_VIEWS_THRESHOLD {
		boost += WARM_VIEWS_BOOST;
	}

	boost
}

/// Sort key for one candidate. Within a single result set either every key
/// carries a native rank or none does; the two never mix.
#[derive(Clone, Copy, Debug)]
pub struct RankKey {
	pub native_rank: Option<f32>,
	pub boost: i32,
	pub created_at: OffsetDateTime,
	pub id: Uuid,
}

/// Total order over candidates: native rank desc, boost desc, created_at
/// desc, id asc. The trailing id comparison makes the order deterministic
/// for equal scores and timestamps.
pub fn compare(a: &RankKey, b: &RankKey) -> Ordering {
	let a_native = a.native_rank.unwrap_or(f32::NEG_INFINITY);
	let b_native = b.native_rank.unwrap_or(f32::NEG_INFINITY);

	b_native
		.partial_cmp(&a_native)
		.unwrap_or(Ordering::Equal)
		.then_with(|| b.boost.cmp(&a.boost))
		.then_with(|| b.created_at.cmp(&a.created_at))
		.then_with(|| a.id.cmp(&b.id))
}
