use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
	FullTime,
	PartTime,
	Contract,
	Internship,
}

impl JobType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::FullTime => "full_time",
			Self::PartTime => "part_time",
			Self::Contract => "contract",
			Self::Internship => "internship",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"full_time" => Some(Self::FullTime),
			"part_time" => Some(Self::PartTime),
			"contract" => Some(Self::Contract),
			"internship" => Some(Self::Internship),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
	Active,
	Pending,
	Closed,
	Expired,
}

impl JobStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Active => "active",
			Self::Pending => "pending",
			Self::Closed => "closed",
			Self::Expired => "expired",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"active" => Some(Self::Active),
			"pending" => Some(Self::Pending),
			"closed" => Some(Self::Closed),
			"expired" => Some(Self::Expired),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterError {
	SalaryBoundsReversed { min: i64, max: i64 },
	SalaryNegative { field: &'static str },
	UnknownJobType { value: String },
	UnknownStatus { value: String },
}

impl FilterError {
	/// The request field the error should be reported against.
	pub fn field(&self) -> &'static str {
		match self {
			Self::SalaryBoundsReversed { .. } => "salary_min",
			Self::SalaryNegative { field } => *field,
			Self::UnknownJobType { .. } => "job_type",
			Self::UnknownStatus { .. } => "status",
		}
	}
}

impl std::fmt::Display for FilterError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::SalaryBoundsReversed { min, max } => {
				write!(f, "salary_min {min} is greater than salary_max {max}.")
			},
			Self::SalaryNegative { field } => write!(f, "{field} must not be negative."),
			Self::UnknownJobType { value } => write!(f, "Unknown job type {value:?}."),
			Self::UnknownStatus { value } => write!(f, "Unknown status {value:?}."),
		}
	}
}

impl std::error::Error for FilterError {}

/// Raw filter input as supplied by a caller, prior to normalization.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchFilterInput {
	pub category_id: Option<Uuid>,
	pub location: Option<String>,
	pub job_type: Option<String>,
	pub salary_min: Option<i64>,
	pub salary_max: Option<i64>,
	pub featured: Option<bool>,
	pub status: Option<String>,
}

/// Validated filter set. Construct through [`normalize`] only.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchFilterSet {
	pub query: String,
	pub category_id: Option<Uuid>,
	pub location: Option<String>,
	pub job_type: Option<JobType>,
	pub salary_min: Option<i64>,
	pub salary_max: Option<i64>,
	pub featured: Option<bool>,
	pub status: JobStatus,
}

impl SearchFilterSet {
	pub fn has_query(&self) -> bool {
		!self.query.is_empty()
	}
}

/// Validates raw input into a [`SearchFilterSet`].
///
/// Callers without elevated capability always get `status = active`; any
/// status value they supplied is ignored rather than rejected.
pub fn normalize(
	raw_query: &str,
	input: &SearchFilterInput,
	elevated: bool,
) -> Result<SearchFilterSet, FilterError> {
	if let Some(min) = input.salary_min
		&& min < 0
	{
		return Err(FilterError::SalaryNegative { field: "salary_min" });
	}
	if let Some(max) = input.salary_max
		&& max < 0
	{
		return Err(FilterError::SalaryNegative { field: "salary_max" });
	}
	if let (Some(min), Some(max)) = (input.salary_min, input.salary_max)
		&& min > max
	{
		return Err(FilterError::SalaryBoundsReversed { min, max });
	}

	let job_type = match input.job_type.as_deref().map(str::trim) {
		None | Some("") => None,
		Some(value) => Some(
			JobType::parse(value)
				.ok_or_else(|| FilterError::UnknownJobType { value: value.to_string() })?,
		),
	};
	let status = if elevated {
		match input.status.as_deref().map(str::trim) {
			None | Some("") => JobStatus::Active,
			Some(value) => JobStatus::parse(value)
				.ok_or_else(|| FilterError::UnknownStatus { value: value.to_string() })?,
		}
	} else {
		JobStatus::Active
	};
	let location = input
		.location
		.as_deref()
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.map(str::to_string);

	Ok(SearchFilterSet {
		query: raw_query.trim().to_string(),
		category_id: input.category_id,
		location,
		job_type,
		salary_min: input.salary_min,
		salary_max: input.salary_max,
		featured: input.featured,
		status,
	})
}
