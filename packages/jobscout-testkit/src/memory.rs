use std::{
	collections::{BTreeSet, HashMap, HashSet},
	sync::{
		Arc, Mutex,
		atomic::{AtomicBool, Ordering},
	},
};

use time::OffsetDateTime;
use uuid::Uuid;

use jobscout_domain::{
	alerts::AlertFrequency,
	filters::SearchFilterSet,
	similarity::{SIMILARITY_THRESHOLD, trigram_similarity},
};
use jobscout_storage::{
	AlertStore, BoxFuture, Error, HistoryStore, JobStore, Result, SavedSearchStore, Stores,
	TermStore,
	models::{
		JobRecord, NewSearchEvent, PopularQuery, PopularSearchTerm, RankedJob, SavedSearch,
		SearchAlert, SearchHistoryEntry, SearchStatistics,
	},
};

const TITLE_WEIGHT: f32 = 1.0;
const DESCRIPTION_WEIGHT: f32 = 0.4;
const REQUIREMENTS_WEIGHT: f32 = 0.4;
const LOCATION_WEIGHT: f32 = 0.2;

#[derive(Default)]
struct Inner {
	full_text: bool,
	similarity: bool,
	fail_full_text: AtomicBool,
	jobs: Mutex<Vec<JobRecord>>,
	history: Mutex<Vec<SearchHistoryEntry>>,
	terms: Mutex<HashMap<String, PopularSearchTerm>>,
	saved_searches: Mutex<Vec<SavedSearch>>,
	alerts: Mutex<Vec<SearchAlert>>,
}

/// In-process implementation of every store trait, with the full-text and
/// similarity capabilities switchable so degradation paths are testable.
#[derive(Clone)]
pub struct MemoryStores {
	inner: Arc<Inner>,
}

impl Default for MemoryStores {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryStores {
	pub fn new() -> Self {
		Self::with_capabilities(true, true)
	}

	pub fn with_capabilities(full_text: bool, similarity: bool) -> Self {
		Self { inner: Arc::new(Inner { full_text, similarity, ..Inner::default() }) }
	}

	/// Makes the full-text tier error while the capability probe still
	/// reports support, which is the transparent-fallback path.
	pub fn set_full_text_failing(&self, failing: bool) {
		self.inner.fail_full_text.store(failing, Ordering::SeqCst);
	}

	pub fn stores(&self) -> Stores {
		let store = Arc::new(self.clone());

		Stores {
			jobs: store.clone(),
			history: store.clone(),
			terms: store.clone(),
			saved_searches: store.clone(),
			alerts: store,
		}
	}

	pub fn insert_job(&self, job: JobRecord) {
		self.inner.jobs.lock().unwrap_or_else(|err| err.into_inner()).push(job);
	}

	pub fn job(&self, job_id: Uuid) -> Option<JobRecord> {
		self.inner
			.jobs
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.iter()
			.find(|job| job.job_id == job_id)
			.cloned()
	}

	pub fn insert_term(&self, term: PopularSearchTerm) {
		self.inner
			.terms
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.insert(term.term.clone(), term);
	}

	pub fn term_search_count(&self, term: &str) -> Option<i64> {
		self.inner
			.terms
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.get(term)
			.map(|row| row.search_count)
	}

	pub fn insert_history(&self, entry: SearchHistoryEntry) {
		self.inner.history.lock().unwrap_or_else(|err| err.into_inner()).push(entry);
	}

	pub fn history_entries(&self) -> Vec<SearchHistoryEntry> {
		self.inner.history.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn insert_alert(&self, alert: SearchAlert) {
		self.inner.alerts.lock().unwrap_or_else(|err| err.into_inner()).push(alert);
	}

	pub fn alert(&self, alert_id: Uuid) -> Option<SearchAlert> {
		self.inner
			.alerts
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.iter()
			.find(|alert| alert.alert_id == alert_id)
			.cloned()
	}

	pub fn saved_search(&self, saved_search_id: Uuid) -> Option<SavedSearch> {
		self.inner
			.saved_searches
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.iter()
			.find(|saved| saved.saved_search_id == saved_search_id)
			.cloned()
	}
}

fn structural_match(job: &JobRecord, filters: &SearchFilterSet) -> bool {
	if job.status != filters.status.as_str() {
		return false;
	}
	if let Some(category_id) = filters.category_id
		&& job.category_id != Some(category_id)
	{
		return false;
	}
	if let Some(location) = &filters.location
		&& !job.location.to_lowercase().contains(&location.to_lowercase())
	{
		return false;
	}
	if let Some(job_type) = filters.job_type
		&& job.job_type != job_type.as_str()
	{
		return false;
	}
	if let Some(min) = filters.salary_min
		&& !job.salary_min.map(|value| value >= min).unwrap_or(false)
	{
		return false;
	}
	if let Some(max) = filters.salary_max
		&& !job.salary_max.map(|value| value <= max).unwrap_or(false)
	{
		return false;
	}
	if let Some(featured) = filters.featured
		&& job.is_featured != featured
	{
		return false;
	}

	true
}

fn substring_match(job: &JobRecord, query: &str) -> bool {
	let query = query.to_lowercase();

	job.title.to_lowercase().contains(&query)
		|| job.description.to_lowercase().contains(&query)
		|| job.requirements.to_lowercase().contains(&query)
		|| job.location.to_lowercase().contains(&query)
}

/// Approximation of the weighted-document semantics the Postgres backend
/// gets from `tsvector`: every query word must appear in some field, and
/// the rank accumulates the weights of the fields containing each word,
/// squashed into the 0..1 band.
fn weighted_rank(job: &JobRecord, query: &str) -> Option<f32> {
	let words: Vec<String> =
		query.to_lowercase().split_whitespace().map(str::to_string).collect();

	if words.is_empty() {
		return None;
	}

	let fields = [
		(job.title.to_lowercase(), TITLE_WEIGHT),
		(job.description.to_lowercase(), DESCRIPTION_WEIGHT),
		(job.requirements.to_lowercase(), REQUIREMENTS_WEIGHT),
		(job.location.to_lowercase(), LOCATION_WEIGHT),
	];
	let mut raw = 0.0;

	for word in &words {
		let mut matched = false;

		for (text, weight) in &fields {
			if text.contains(word.as_str()) {
				raw += weight;
				matched = true;
			}
		}

		if !matched {
			return None;
		}
	}

	Some(raw / (1.0 + raw))
}

impl JobStore for MemoryStores {
	fn supports_full_text(&self) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move { Ok(self.inner.full_text) })
	}

	fn search_full_text<'a>(
		&'a self,
		filters: &'a SearchFilterSet,
	) -> BoxFuture<'a, Result<Vec<RankedJob>>> {
		Box::pin(async move {
			if self.inner.fail_full_text.load(Ordering::SeqCst) {
				return Err(Error::Unsupported("full_text"));
			}

			let jobs = self.inner.jobs.lock().unwrap_or_else(|err| err.into_inner());
			let mut ranked: Vec<RankedJob> = jobs
				.iter()
				.filter(|job| structural_match(job, filters))
				.filter_map(|job| {
					weighted_rank(job, &filters.query)
						.map(|rank| RankedJob { job: job.clone(), native_rank: Some(rank) })
				})
				.collect();

			drop(jobs);

			ranked.sort_by(|a, b| {
				b.native_rank
					.partial_cmp(&a.native_rank)
					.unwrap_or(std::cmp::Ordering::Equal)
					.then_with(|| b.job.created_at.cmp(&a.job.created_at))
					.then_with(|| a.job.job_id.cmp(&b.job.job_id))
			});

			Ok(ranked)
		})
	}

	fn search_substring<'a>(
		&'a self,
		filters: &'a SearchFilterSet,
	) -> BoxFuture<'a, Result<Vec<JobRecord>>> {
		Box::pin(async move {
			let jobs = self.inner.jobs.lock().unwrap_or_else(|err| err.into_inner());
			let mut matched: Vec<JobRecord> = jobs
				.iter()
				.filter(|job| structural_match(job, filters))
				.filter(|job| !filters.has_query() || substring_match(job, &filters.query))
				.cloned()
				.collect();

			drop(jobs);

			matched.sort_by(|a, b| {
				b.created_at.cmp(&a.created_at).then_with(|| a.job_id.cmp(&b.job_id))
			});

			Ok(matched)
		})
	}

	fn active_titles_containing<'a>(
		&'a self,
		needle: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			let needle = needle.to_lowercase();
			let jobs = self.inner.jobs.lock().unwrap_or_else(|err| err.into_inner());
			let titles: BTreeSet<String> = jobs
				.iter()
				.filter(|job| job.status == "active")
				.filter(|job| job.title.to_lowercase().contains(&needle))
				.map(|job| job.title.clone())
				.collect();

			Ok(titles.into_iter().take(limit.max(0) as usize).collect())
		})
	}

	fn active_locations_containing<'a>(
		&'a self,
		needle: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			let needle = needle.to_lowercase();
			let jobs = self.inner.jobs.lock().unwrap_or_else(|err| err.into_inner());
			let locations: BTreeSet<String> = jobs
				.iter()
				.filter(|job| job.status == "active" && !job.location.is_empty())
				.filter(|job| job.location.to_lowercase().contains(&needle))
				.map(|job| job.location.clone())
				.collect();

			Ok(locations.into_iter().take(limit.max(0) as usize).collect())
		})
	}
}

impl HistoryStore for MemoryStores {
	fn append(&self, event: NewSearchEvent) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let entry = SearchHistoryEntry {
				history_id: Uuid::new_v4(),
				user_id: event.user_id,
				query: event.query,
				filters: event.filters,
				result_count: event.result_count,
				client_ip: event.client_ip,
				created_at: event.created_at,
			};

			self.inner.history.lock().unwrap_or_else(|err| err.into_inner()).push(entry);

			Ok(())
		})
	}

	fn user_history(
		&self,
		user_id: Uuid,
		limit: i64,
	) -> BoxFuture<'_, Result<Vec<SearchHistoryEntry>>> {
		Box::pin(async move {
			let history = self.inner.history.lock().unwrap_or_else(|err| err.into_inner());
			let mut entries: Vec<SearchHistoryEntry> =
				history.iter().filter(|entry| entry.user_id == Some(user_id)).cloned().collect();

			drop(history);

			entries.sort_by(|a, b| {
				b.created_at.cmp(&a.created_at).then_with(|| a.history_id.cmp(&b.history_id))
			});
			entries.truncate(limit.max(0) as usize);

			Ok(entries)
		})
	}

	fn statistics(&self, since: OffsetDateTime) -> BoxFuture<'_, Result<SearchStatistics>> {
		Box::pin(async move {
			let history = self.inner.history.lock().unwrap_or_else(|err| err.into_inner());
			let in_window: Vec<&SearchHistoryEntry> =
				history.iter().filter(|entry| entry.created_at >= since).collect();
			let total_searches = in_window.len() as i64;
			let unique_queries = in_window
				.iter()
				.map(|entry| entry.query.trim().to_lowercase())
				.collect::<HashSet<_>>()
				.len() as i64;
			let average_result_count = if in_window.is_empty() {
				0.0
			} else {
				in_window.iter().map(|entry| entry.result_count as f64).sum::<f64>()
					/ in_window.len() as f64
			};
			let distinct_searching_users = in_window
				.iter()
				.filter_map(|entry| entry.user_id)
				.collect::<HashSet<_>>()
				.len() as i64;

			Ok(SearchStatistics {
				total_searches,
				unique_queries,
				average_result_count,
				distinct_searching_users,
			})
		})
	}

	fn popular_queries(
		&self,
		since: OffsetDateTime,
		limit: i64,
	) -> BoxFuture<'_, Result<Vec<PopularQuery>>> {
		Box::pin(async move {
			let history = self.inner.history.lock().unwrap_or_else(|err| err.into_inner());
			let mut grouped: HashMap<String, PopularQuery> = HashMap::new();

			for entry in history.iter().filter(|entry| entry.created_at >= since) {
				let trimmed = entry.query.trim();

				if trimmed.chars().count() < 2 {
					continue;
				}

				let term = trimmed.to_lowercase();

				grouped
					.entry(term.clone())
					.and_modify(|row| {
						row.count += 1;
						row.last_searched_at = row.last_searched_at.max(entry.created_at);
					})
					.or_insert(PopularQuery {
						term,
						count: 1,
						last_searched_at: entry.created_at,
					});
			}

			drop(history);

			let mut terms: Vec<PopularQuery> = grouped.into_values().collect();

			terms.sort_by(|a, b| {
				b.count
					.cmp(&a.count)
					.then_with(|| b.last_searched_at.cmp(&a.last_searched_at))
			});
			terms.truncate(limit.max(0) as usize);

			Ok(terms)
		})
	}
}

impl TermStore for MemoryStores {
	fn increment_term(&self, term: String, now: OffsetDateTime) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let mut terms = self.inner.terms.lock().unwrap_or_else(|err| err.into_inner());

			terms
				.entry(term.clone())
				.and_modify(|row| {
					row.search_count += 1;
					row.last_seen_at = now;
				})
				.or_insert(PopularSearchTerm {
					term,
					search_count: 1,
					first_seen_at: now,
					last_seen_at: now,
				});

			Ok(())
		})
	}

	fn terms_containing<'a>(
		&'a self,
		needle: &'a str,
		exclude_exact: Option<&'a str>,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<PopularSearchTerm>>> {
		Box::pin(async move {
			let needle = needle.to_lowercase();
			let excluded = exclude_exact.map(str::to_lowercase);
			let terms = self.inner.terms.lock().unwrap_or_else(|err| err.into_inner());
			let mut matched: Vec<PopularSearchTerm> = terms
				.values()
				.filter(|row| row.term.to_lowercase().contains(&needle))
				.filter(|row| {
					excluded
						.as_deref()
						.map(|excluded| row.term.to_lowercase() != excluded)
						.unwrap_or(true)
				})
				.cloned()
				.collect();

			drop(terms);

			matched.sort_by(|a, b| {
				b.search_count
					.cmp(&a.search_count)
					.then_with(|| b.last_seen_at.cmp(&a.last_seen_at))
			});
			matched.truncate(limit.max(0) as usize);

			Ok(matched)
		})
	}

	fn terms_similar<'a>(
		&'a self,
		query: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<PopularSearchTerm>>> {
		Box::pin(async move {
			if !self.inner.similarity {
				return Err(Error::Unsupported("similarity"));
			}

			let query_lower = query.to_lowercase();
			let terms = self.inner.terms.lock().unwrap_or_else(|err| err.into_inner());
			let mut scored: Vec<(PopularSearchTerm, f64)> = terms
				.values()
				.filter(|row| row.term.to_lowercase() != query_lower)
				.filter_map(|row| {
					let score = trigram_similarity(&row.term, query);

					(score > SIMILARITY_THRESHOLD).then(|| (row.clone(), score))
				})
				.collect();

			drop(terms);

			scored.sort_by(|(a, a_score), (b, b_score)| {
				b_score
					.partial_cmp(a_score)
					.unwrap_or(std::cmp::Ordering::Equal)
					.then_with(|| b.search_count.cmp(&a.search_count))
			});
			scored.truncate(limit.max(0) as usize);

			Ok(scored.into_iter().map(|(row, _)| row).collect())
		})
	}
}

impl SavedSearchStore for MemoryStores {
	fn create(&self, saved: SavedSearch) -> BoxFuture<'_, Result<SavedSearch>> {
		Box::pin(async move {
			let mut rows = self.inner.saved_searches.lock().unwrap_or_else(|err| err.into_inner());

			if rows.iter().any(|row| row.owner_id == saved.owner_id && row.name == saved.name) {
				return Err(Error::Conflict(format!(
					"Saved search named {:?} already exists.",
					saved.name
				)));
			}

			rows.push(saved.clone());

			Ok(saved)
		})
	}

	fn list(&self, owner_id: Uuid) -> BoxFuture<'_, Result<Vec<SavedSearch>>> {
		Box::pin(async move {
			let rows = self.inner.saved_searches.lock().unwrap_or_else(|err| err.into_inner());
			let mut listed: Vec<SavedSearch> =
				rows.iter().filter(|row| row.owner_id == owner_id).cloned().collect();

			drop(rows);

			listed.sort_by(|a, b| {
				b.created_at
					.cmp(&a.created_at)
					.then_with(|| a.saved_search_id.cmp(&b.saved_search_id))
			});

			Ok(listed)
		})
	}

	fn fetch(&self, owner_id: Uuid, saved_search_id: Uuid) -> BoxFuture<'_, Result<SavedSearch>> {
		Box::pin(async move {
			self.inner
				.saved_searches
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.iter()
				.find(|row| row.owner_id == owner_id && row.saved_search_id == saved_search_id)
				.cloned()
				.ok_or_else(|| Error::NotFound(format!("Saved search {saved_search_id} not found.")))
		})
	}

	fn update(&self, saved: SavedSearch) -> BoxFuture<'_, Result<SavedSearch>> {
		Box::pin(async move {
			let mut rows = self.inner.saved_searches.lock().unwrap_or_else(|err| err.into_inner());

			if rows.iter().any(|row| {
				row.owner_id == saved.owner_id
					&& row.saved_search_id != saved.saved_search_id
					&& row.name == saved.name
			}) {
				return Err(Error::Conflict(format!(
					"Saved search named {:?} already exists.",
					saved.name
				)));
			}

			let Some(row) = rows.iter_mut().find(|row| {
				row.owner_id == saved.owner_id && row.saved_search_id == saved.saved_search_id
			}) else {
				return Err(Error::NotFound(format!(
					"Saved search {} not found.",
					saved.saved_search_id
				)));
			};

			row.name = saved.name.clone();
			row.query = saved.query.clone();
			row.filters = saved.filters.clone();
			row.is_active = saved.is_active;
			row.updated_at = saved.updated_at;

			Ok(saved)
		})
	}

	fn delete(&self, owner_id: Uuid, saved_search_id: Uuid) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let mut rows = self.inner.saved_searches.lock().unwrap_or_else(|err| err.into_inner());
			let before = rows.len();

			rows.retain(|row| {
				!(row.owner_id == owner_id && row.saved_search_id == saved_search_id)
			});

			if rows.len() == before {
				return Err(Error::NotFound(format!("Saved search {saved_search_id} not found.")));
			}

			Ok(())
		})
	}

	fn touch_executed(
		&self,
		owner_id: Uuid,
		saved_search_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let mut rows = self.inner.saved_searches.lock().unwrap_or_else(|err| err.into_inner());
			let Some(row) = rows
				.iter_mut()
				.find(|row| row.owner_id == owner_id && row.saved_search_id == saved_search_id)
			else {
				return Err(Error::NotFound(format!("Saved search {saved_search_id} not found.")));
			};

			row.last_executed_at = Some(now);

			Ok(())
		})
	}
}

impl AlertStore for MemoryStores {
	fn create(&self, alert: SearchAlert) -> BoxFuture<'_, Result<SearchAlert>> {
		Box::pin(async move {
			self.inner.alerts.lock().unwrap_or_else(|err| err.into_inner()).push(alert.clone());

			Ok(alert)
		})
	}

	fn list(&self, owner_id: Uuid) -> BoxFuture<'_, Result<Vec<SearchAlert>>> {
		Box::pin(async move {
			let rows = self.inner.alerts.lock().unwrap_or_else(|err| err.into_inner());
			let mut listed: Vec<SearchAlert> =
				rows.iter().filter(|row| row.owner_id == owner_id).cloned().collect();

			drop(rows);

			listed.sort_by(|a, b| {
				b.created_at.cmp(&a.created_at).then_with(|| a.alert_id.cmp(&b.alert_id))
			});

			Ok(listed)
		})
	}

	fn fetch(&self, owner_id: Uuid, alert_id: Uuid) -> BoxFuture<'_, Result<SearchAlert>> {
		Box::pin(async move {
			self.inner
				.alerts
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.iter()
				.find(|row| row.owner_id == owner_id && row.alert_id == alert_id)
				.cloned()
				.ok_or_else(|| Error::NotFound(format!("Alert {alert_id} not found.")))
		})
	}

	fn update(&self, alert: SearchAlert) -> BoxFuture<'_, Result<SearchAlert>> {
		Box::pin(async move {
			let mut rows = self.inner.alerts.lock().unwrap_or_else(|err| err.into_inner());
			let Some(row) = rows
				.iter_mut()
				.find(|row| row.owner_id == alert.owner_id && row.alert_id == alert.alert_id)
			else {
				return Err(Error::NotFound(format!("Alert {} not found.", alert.alert_id)));
			};

			row.name = alert.name.clone();
			row.query = alert.query.clone();
			row.filters = alert.filters.clone();
			row.frequency = alert.frequency.clone();
			row.is_active = alert.is_active;
			row.updated_at = alert.updated_at;

			Ok(alert)
		})
	}

	fn delete(&self, owner_id: Uuid, alert_id: Uuid) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let mut rows = self.inner.alerts.lock().unwrap_or_else(|err| err.into_inner());
			let before = rows.len();

			rows.retain(|row| !(row.owner_id == owner_id && row.alert_id == alert_id));

			if rows.len() == before {
				return Err(Error::NotFound(format!("Alert {alert_id} not found.")));
			}

			Ok(())
		})
	}

	fn toggle(
		&self,
		owner_id: Uuid,
		alert_id: Uuid,
		now: OffsetDateTime,
	) -> BoxFuture<'_, Result<SearchAlert>> {
		Box::pin(async move {
			let mut rows = self.inner.alerts.lock().unwrap_or_else(|err| err.into_inner());
			let Some(row) =
				rows.iter_mut().find(|row| row.owner_id == owner_id && row.alert_id == alert_id)
			else {
				return Err(Error::NotFound(format!("Alert {alert_id} not found.")));
			};

			row.is_active = !row.is_active;
			row.updated_at = now;

			Ok(row.clone())
		})
	}

	fn active_alerts(
		&self,
		frequency: Option<AlertFrequency>,
		limit: i64,
	) -> BoxFuture<'_, Result<Vec<SearchAlert>>> {
		Box::pin(async move {
			let rows = self.inner.alerts.lock().unwrap_or_else(|err| err.into_inner());
			let mut active: Vec<SearchAlert> = rows
				.iter()
				.filter(|row| row.is_active)
				.filter(|row| {
					frequency
						.map(|frequency| row.frequency == frequency.as_str())
						.unwrap_or(true)
				})
				.cloned()
				.collect();

			drop(rows);

			active.sort_by(|a, b| {
				a.created_at.cmp(&b.created_at).then_with(|| a.alert_id.cmp(&b.alert_id))
			});
			active.truncate(limit.max(0) as usize);

			Ok(active)
		})
	}

	fn mark_notified(
		&self,
		alert_id: Uuid,
		now: OffsetDateTime,
		last_seen_job_id: Option<Uuid>,
	) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let mut rows = self.inner.alerts.lock().unwrap_or_else(|err| err.into_inner());

			if let Some(row) = rows.iter_mut().find(|row| row.alert_id == alert_id) {
				row.last_notified_at = Some(now);
				row.last_seen_job_id = last_seen_job_id;
				row.updated_at = now;
			}

			Ok(())
		})
	}
}
