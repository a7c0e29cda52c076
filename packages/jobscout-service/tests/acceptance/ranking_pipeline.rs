use time::OffsetDateTime;
use uuid::Uuid;

use jobscout_domain::filters::SearchFilterInput;
use jobscout_service::{RequesterContext, SearchRequest};
use jobscout_testkit::MemoryStores;

fn request(query: &str) -> SearchRequest {
	SearchRequest {
		query: query.to_string(),
		filters: SearchFilterInput::default(),
		limit: None,
		offset: None,
	}
}

/// The canonical ordering scenario, run against the full-text tier and
/// the substring tier. Both must produce the same order: the featured,
/// recent senior role first on its larger composite boost, the old intern
/// role second, the non-matching Java role absent.
#[tokio::test]
async fn python_scenario_ranks_identically_on_both_tiers() {
	for memory in [MemoryStores::new(), MemoryStores::with_capabilities(false, true)] {
		let service = super::service(&memory);
		let senior = super::dummy_job("Senior Python Developer", 3, true);
		let intern = super::dummy_job("Python Intern", 40, false);
		let senior_id = senior.job_id;
		let intern_id = intern.job_id;

		memory.insert_job(senior);
		memory.insert_job(intern);
		memory.insert_job(super::dummy_job("Java Developer", 1, false));

		let response = service
			.search(request("python"), &RequesterContext::anonymous())
			.await
			.expect("Search failed.");
		let ids: Vec<Uuid> = response.results.iter().map(|job| job.id).collect();

		assert_eq!(response.total_count, 2);
		assert_eq!(ids, vec![senior_id, intern_id]);
		assert_eq!(response.results[0].score, 18);
		assert_eq!(response.results[1].score, 10);
	}
}

#[tokio::test]
async fn featuring_a_job_never_lowers_its_position() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let plain = super::dummy_job("Python Developer", 10, false);
	let featured = super::dummy_job("Python Developer", 10, true);
	let featured_id = featured.job_id;

	memory.insert_job(plain);
	memory.insert_job(featured);

	let response = service
		.search(request("python"), &RequesterContext::anonymous())
		.await
		.expect("Search failed.");

	assert_eq!(response.results[0].id, featured_id);
	assert_eq!(response.results[0].score - response.results[1].score, 5);
}

#[tokio::test]
async fn repeated_searches_return_identical_order() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let created_at = OffsetDateTime::now_utc() - time::Duration::days(10);
	let mut seeded: Vec<Uuid> = Vec::new();

	// Identical titles and timestamps leave only the id tie-break.
	for _ in 0..4 {
		let mut job = super::dummy_job("Python Developer", 10, false);

		job.created_at = created_at;
		seeded.push(job.job_id);

		memory.insert_job(job);
	}

	let requester = RequesterContext::anonymous();
	let first = service.search(request("python"), &requester).await.expect("Search failed.");
	let second = service.search(request("python"), &requester).await.expect("Search failed.");
	let first_ids: Vec<Uuid> = first.results.iter().map(|job| job.id).collect();
	let second_ids: Vec<Uuid> = second.results.iter().map(|job| job.id).collect();

	assert_eq!(first_ids, second_ids);

	seeded.sort();

	assert_eq!(first_ids, seeded);
}

#[tokio::test]
async fn pagination_windows_tile_the_full_order() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let created_at = OffsetDateTime::now_utc() - time::Duration::days(3);

	for _ in 0..5 {
		let mut job = super::dummy_job("Python Developer", 3, false);

		job.created_at = created_at;

		memory.insert_job(job);
	}

	let requester = RequesterContext::anonymous();
	let full = service.search(request("python"), &requester).await.expect("Search failed.");
	let full_ids: Vec<Uuid> = full.results.iter().map(|job| job.id).collect();

	assert_eq!(full.total_count, 5);
	assert_eq!(full_ids.len(), 5);

	let mut paged: Vec<Uuid> = Vec::new();

	for offset in [0, 2, 4] {
		let response = service
			.search(
				SearchRequest {
					query: "python".to_string(),
					filters: SearchFilterInput::default(),
					limit: Some(2),
					offset: Some(offset),
				},
				&requester,
			)
			.await
			.expect("Search failed.");

		assert_eq!(response.total_count, 5);

		paged.extend(response.results.iter().map(|job| job.id));
	}

	assert_eq!(paged, full_ids);
}

#[tokio::test]
async fn full_text_failure_degrades_to_substring_results() {
	let memory = MemoryStores::new();

	memory.set_full_text_failing(true);

	let service = super::service(&memory);
	let senior = super::dummy_job("Senior Python Developer", 3, true);
	let intern = super::dummy_job("Python Intern", 40, false);
	let senior_id = senior.job_id;
	let intern_id = intern.job_id;

	memory.insert_job(senior);
	memory.insert_job(intern);

	let response = service
		.search(request("python"), &RequesterContext::anonymous())
		.await
		.expect("Search failed.");
	let ids: Vec<Uuid> = response.results.iter().map(|job| job.id).collect();

	assert_eq!(ids, vec![senior_id, intern_id]);
	assert_eq!(response.results[0].score, 18);
}

#[tokio::test]
async fn limit_and_offset_edges_clamp() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);

	memory.insert_job(super::dummy_job("Python Developer", 1, false));
	memory.insert_job(super::dummy_job("Python Architect", 2, false));

	let requester = RequesterContext::anonymous();
	let response = service
		.search(
			SearchRequest {
				query: "python".to_string(),
				filters: SearchFilterInput::default(),
				limit: Some(0),
				offset: None,
			},
			&requester,
		)
		.await
		.expect("Search failed.");

	assert_eq!(response.results.len(), 1);
	assert_eq!(response.total_count, 2);

	let response = service
		.search(
			SearchRequest {
				query: "python".to_string(),
				filters: SearchFilterInput::default(),
				limit: None,
				offset: Some(-5),
			},
			&requester,
		)
		.await
		.expect("Search failed.");

	assert_eq!(response.results.len(), 2);
}

#[tokio::test]
async fn empty_query_lists_by_recency_with_zero_scores() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let newer = super::dummy_job("Python Developer", 1, true);
	let older = super::dummy_job("Data Engineer", 5, false);
	let newer_id = newer.job_id;
	let older_id = older.job_id;

	memory.insert_job(newer);
	memory.insert_job(older);

	let response = service
		.search(request(""), &RequesterContext::anonymous())
		.await
		.expect("Search failed.");
	let ids: Vec<Uuid> = response.results.iter().map(|job| job.id).collect();

	assert_eq!(response.total_count, 2);
	assert_eq!(ids, vec![newer_id, older_id]);
	assert!(response.results.iter().all(|job| job.score == 0));
}
