use std::collections::HashSet;

/// Minimum similarity for a term to qualify as a "did you mean" candidate.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Trigram similarity on a 0-1 scale, matching the semantics of the
/// Postgres `pg_trgm` extension: words are lower-cased, padded with two
/// leading and one trailing space, and the score is the Jaccard ratio of
/// the distinct trigram sets.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
	let a_trigrams = trigrams(a);
	let b_trigrams = trigrams(b);
	let shared = a_trigrams.intersection(&b_trigrams).count();
	let union = a_trigrams.len() + b_trigrams.len() - shared;

	if union == 0 {
		return 0.0;
	}

	shared as f64 / union as f64
}

fn trigrams(input: &str) -> HashSet<String> {
	let lowered = input.to_lowercase();
	let mut set = HashSet::new();

	for word in lowered.split(|ch: char| !ch.is_alphanumeric()).filter(|word| !word.is_empty()) {
		let padded: Vec<char> =
			"  ".chars().chain(word.chars()).chain(" ".chars()).collect();

		for window in padded.windows(3) {
			set.insert(window.iter().collect());
		}
	}

	set
}
