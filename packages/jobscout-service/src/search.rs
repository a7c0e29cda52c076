use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use jobscout_domain::{
	filters::{self, SearchFilterInput, SearchFilterSet},
	ranking::{self, RankKey, RankOptions},
	terms,
};
use jobscout_storage::models::{NewSearchEvent, RankedJob};

use crate::{RequesterContext, SearchService, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub query: String,
	#[serde(default)]
	pub filters: SearchFilterInput,
	pub limit: Option<i64>,
	pub offset: Option<i64>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JobSummary {
	pub id: Uuid,
	pub title: String,
	pub location: String,
	pub job_type: String,
	pub salary_min: Option<i64>,
	pub salary_max: Option<i64>,
	pub is_featured: bool,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Composite relevance boost. Zero when the search had no text query.
	pub score: i32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchResponse {
	pub results: Vec<JobSummary>,
	pub total_count: i64,
}

impl SearchService {
	pub async fn search(
		&self,
		req: SearchRequest,
		requester: &RequesterContext,
	) -> ServiceResult<SearchResponse> {
		let filters =
			filters::normalize(&req.query, &req.filters, requester.capability.is_elevated())?;
		let now = OffsetDateTime::now_utc();
		let candidates = self.candidate_set(&filters).await?;
		let ranked = rank_candidates(candidates, &filters.query, self.rank_options(), now);
		let total_count = ranked.len() as i64;
		let limit = self.clamp_limit(req.limit);
		let offset = req.offset.unwrap_or(0).max(0);
		let results = ranked
			.into_iter()
			.skip(offset as usize)
			.take(limit as usize)
			.map(|(candidate, boost)| summarize(candidate, boost))
			.collect();

		self.record_search(&filters, requester, total_count, now);

		Ok(SearchResponse { results, total_count })
	}

	/// Builds the candidate set for a validated filter set, choosing the
	/// search tier per the backend's capability probe. A full-text failure
	/// is logged and degrades to the substring tier; it never fails the
	/// search.
	pub(crate) async fn candidate_set(
		&self,
		filters: &SearchFilterSet,
	) -> ServiceResult<Vec<RankedJob>> {
		if filters.has_query() {
			match self.stores.jobs.supports_full_text().await {
				Ok(true) => match self.stores.jobs.search_full_text(filters).await {
					Ok(ranked) => return Ok(ranked),
					Err(err) => {
						warn!(
							error = %err,
							"Full-text search failed; falling back to substring matching.",
						);
					},
				},
				Ok(false) => {},
				Err(err) => {
					warn!(
						error = %err,
						"Full-text capability probe failed; falling back to substring matching.",
					);
				},
			}
		}

		let jobs = self.stores.jobs.search_substring(filters).await?;

		Ok(jobs.into_iter().map(RankedJob::unranked).collect())
	}

	/// Best-effort history write. The spawned task outlives the request so
	/// a caller disconnect cannot cancel it; failures are logged and never
	/// surface to the search caller.
	fn record_search(
		&self,
		filters: &SearchFilterSet,
		requester: &RequesterContext,
		result_count: i64,
		now: OffsetDateTime,
	) {
		let event = NewSearchEvent {
			user_id: requester.user_id,
			query: filters.query.clone(),
			filters: serde_json::to_value(filters).unwrap_or(serde_json::Value::Null),
			result_count,
			client_ip: requester.client_ip.clone(),
			created_at: now,
		};
		let term = terms::normalize_term(&filters.query);
		let history = self.stores.history.clone();
		let terms_store = self.stores.terms.clone();

		tokio::spawn(async move {
			if let Err(err) = history.append(event).await {
				warn!(error = %err, "Failed to append search history.");
			}

			let Some(term) = term else {
				return;
			};

			if let Err(err) = terms_store.increment_term(term.clone(), now).await {
				warn!(error = %err, term, "Failed to increment term popularity.");
			}
		});
	}
}

pub(crate) fn summarize(candidate: RankedJob, boost: i32) -> JobSummary {
	JobSummary {
		id: candidate.job.job_id,
		title: candidate.job.title,
		location: candidate.job.location,
		job_type: candidate.job.job_type,
		salary_min: candidate.job.salary_min,
		salary_max: candidate.job.salary_max,
		is_featured: candidate.job.is_featured,
		created_at: candidate.job.created_at,
		score: boost,
	}
}

/// Scores and totally orders a candidate set. Native ranks dominate when
/// present; the composite boost and recency settle the rest, with the id
/// tie-break keeping repeated calls stable.
pub(crate) fn rank_candidates(
	candidates: Vec<RankedJob>,
	query: &str,
	options: RankOptions,
	now: OffsetDateTime,
) -> Vec<(RankedJob, i32)> {
	let mut scored: Vec<(RankedJob, RankKey)> = candidates
		.into_iter()
		.map(|candidate| {
			let boost = ranking::relevance_boost(
				query,
				&candidate.job.title,
				candidate.job.is_featured,
				candidate.job.views_count,
				candidate.job.created_at,
				options,
				now,
			);
			let key = RankKey {
				native_rank: candidate.native_rank,
				boost,
				created_at: candidate.job.created_at,
				id: candidate.job.job_id,
			};

			(candidate, key)
		})
		.collect();

	scored.sort_by(|(_, a), (_, b)| ranking::compare(a, b));

	scored.into_iter().map(|(candidate, key)| (candidate, key.boost)).collect()
}
