use tracing::warn;

use jobscout_domain::{
	suggest::{self, Suggestion},
	terms,
};

use crate::{SearchService, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SuggestionsResponse {
	pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SimilarTermsResponse {
	pub suggestions: Vec<String>,
}

impl SearchService {
	/// Autocomplete over popular terms, active job titles and active job
	/// locations, in that priority order. Input shorter than two
	/// characters yields an empty list, not an error.
	pub async fn autocomplete(
		&self,
		partial_query: &str,
		limit: i64,
	) -> ServiceResult<SuggestionsResponse> {
		let Some(needle) = terms::normalize_term(partial_query) else {
			return Ok(SuggestionsResponse { suggestions: Vec::new() });
		};
		if limit <= 0 {
			return Ok(SuggestionsResponse { suggestions: Vec::new() });
		}

		let popular = self.stores.terms.terms_containing(&needle, None, limit).await?;
		let titles = self.stores.jobs.active_titles_containing(&needle, limit).await?;
		let locations = self.stores.jobs.active_locations_containing(&needle, limit).await?;
		let sources = vec![
			popular
				.into_iter()
				.map(|term| Suggestion::popular(term.term, term.search_count))
				.collect(),
			titles.into_iter().map(Suggestion::job_title).collect(),
			locations.into_iter().map(Suggestion::location).collect(),
		];

		Ok(SuggestionsResponse {
			suggestions: suggest::merge_suggestions(sources, limit as usize),
		})
	}

	/// "Did you mean" terms. The similarity-ranked path needs a backend
	/// primitive; when it is missing or fails, substring containment over
	/// the same terms stands in.
	pub async fn suggest_similar(
		&self,
		query: &str,
		limit: i64,
	) -> ServiceResult<SimilarTermsResponse> {
		let Some(needle) = terms::normalize_term(query) else {
			return Ok(SimilarTermsResponse { suggestions: Vec::new() });
		};
		if limit <= 0 {
			return Ok(SimilarTermsResponse { suggestions: Vec::new() });
		}

		match self.stores.terms.terms_similar(&needle, limit).await {
			Ok(terms) => Ok(SimilarTermsResponse {
				suggestions: terms.into_iter().map(|term| term.term).collect(),
			}),
			Err(err) => {
				warn!(
					error = %err,
					"Similarity lookup unavailable; falling back to substring matching.",
				);

				let terms =
					self.stores.terms.terms_containing(&needle, Some(&needle), limit).await?;

				Ok(SimilarTermsResponse {
					suggestions: terms.into_iter().map(|term| term.term).collect(),
				})
			},
		}
	}
}
