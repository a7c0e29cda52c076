use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

pub const DAILY_MIN_GAP: Duration = Duration::hours(24);
pub const WEEKLY_MIN_GAP: Duration = Duration::hours(7 * 24);
/// Never-notified alerts only look this far back, so a first run does not
/// flood the owner with the entire historical result set.
pub const BOOTSTRAP_WINDOW: Duration = Duration::days(7);
pub const MAX_JOBS_PER_NOTIFICATION: usize = 10;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFrequency {
	Immediate,
	Daily,
	Weekly,
}

impl AlertFrequency {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Immediate => "immediate",
			Self::Daily => "daily",
			Self::Weekly => "weekly",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"immediate" => Some(Self::Immediate),
			"daily" => Some(Self::Daily),
			"weekly" => Some(Self::Weekly),
			_ => None,
		}
	}
}

pub fn alert_due(
	frequency: AlertFrequency,
	last_notified_at: Option<OffsetDateTime>,
	now: OffsetDateTime,
) -> bool {
	let Some(last) = last_notified_at else {
		return true;
	};

	match frequency {
		AlertFrequency::Immediate => true,
		AlertFrequency::Daily => now - last >= DAILY_MIN_GAP,
		AlertFrequency::Weekly => now - last >= WEEKLY_MIN_GAP,
	}
}

/// Results created strictly after this instant count as new for the alert.
pub fn new_since_cutoff(
	last_notified_at: Option<OffsetDateTime>,
	now: OffsetDateTime,
) -> OffsetDateTime {
	match last_notified_at {
		Some(last) => last,
		None => now - BOOTSTRAP_WINDOW,
	}
}
