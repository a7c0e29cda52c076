/// Queries shorter than this never touch popularity tracking or
/// suggestion lookups.
pub const MIN_TERM_CHARS: usize = 2;

/// Canonical form of a search term: trimmed and lower-cased. Returns
/// `None` when the trimmed input is under the minimum length.
pub fn normalize_term(raw: &str) -> Option<String> {
	let trimmed = raw.trim();

	if trimmed.chars().count() < MIN_TERM_CHARS {
		return None;
	}

	Some(trimmed.to_lowercase())
}
