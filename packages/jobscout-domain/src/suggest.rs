use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
	Popular,
	JobTitle,
	Location,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Suggestion {
	pub text: String,
	#[serde(rename = "type")]
	pub kind: SuggestionKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub count: Option<i64>,
}

impl Suggestion {
	pub fn popular(text: impl Into<String>, count: i64) -> Self {
		Self { text: text.into(), kind: SuggestionKind::Popular, count: Some(count) }
	}

	pub fn job_title(text: impl Into<String>) -> Self {
		Self { text: text.into(), kind: SuggestionKind::JobTitle, count: None }
	}

	pub fn location(text: impl Into<String>) -> Self {
		Self { text: text.into(), kind: SuggestionKind::Location, count: None }
	}
}

/// Concatenates suggestion sources in priority order, dropping any
/// candidate whose text case-insensitively repeats an earlier one, and
/// truncates to `limit`.
pub fn merge_suggestions(sources: Vec<Vec<Suggestion>>, limit: usize) -> Vec<Suggestion> {
	let mut seen = HashSet::new();
	let mut merged = Vec::new();

	for source in sources {
		for suggestion in source {
			if merged.len() == limit {
				return merged;
			}
			if seen.insert(suggestion.text.to_lowercase()) {
				merged.push(suggestion);
			}
		}
	}

	merged
}
