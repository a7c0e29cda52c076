use uuid::Uuid;

use jobscout_domain::filters::SearchFilterInput;
use jobscout_service::{RequesterContext, SearchRequest, ServiceError};
use jobscout_testkit::MemoryStores;

fn request_with(query: &str, filters: SearchFilterInput) -> SearchRequest {
	SearchRequest { query: query.to_string(), filters, limit: None, offset: None }
}

#[tokio::test]
async fn standard_callers_never_see_inactive_jobs() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let active = super::dummy_job("Python Developer", 1, false);
	let active_id = active.job_id;

	memory.insert_job(active);

	for status in ["pending", "closed", "expired"] {
		let mut job = super::dummy_job("Python Architect", 1, false);

		job.status = status.to_string();

		memory.insert_job(job);
	}

	let requester = RequesterContext::anonymous();

	// Status values from non-elevated callers are ignored, not rejected,
	// including values that are not a status at all.
	for status in [None, Some("closed".to_string()), Some("nonsense".to_string())] {
		let filters = SearchFilterInput { status: status.clone(), ..SearchFilterInput::default() };
		let response = service
			.search(request_with("python", filters), &requester)
			.await
			.expect("Search failed.");

		assert_eq!(response.total_count, 1, "status filter {status:?}");
		assert_eq!(response.results[0].id, active_id);
	}
}

#[tokio::test]
async fn elevated_callers_filter_by_requested_status() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let active = super::dummy_job("Python Developer", 1, false);
	let mut closed = super::dummy_job("Python Architect", 2, false);

	closed.status = "closed".to_string();

	let closed_id = closed.job_id;

	memory.insert_job(active);
	memory.insert_job(closed);

	let requester = RequesterContext::elevated(Uuid::new_v4());
	let filters =
		SearchFilterInput { status: Some("closed".to_string()), ..SearchFilterInput::default() };
	let response = service
		.search(request_with("python", filters), &requester)
		.await
		.expect("Search failed.");

	assert_eq!(response.total_count, 1);
	assert_eq!(response.results[0].id, closed_id);

	let filters =
		SearchFilterInput { status: Some("archived".to_string()), ..SearchFilterInput::default() };
	let err = service
		.search(request_with("python", filters), &requester)
		.await
		.expect_err("Expected an unknown status to be rejected.");

	assert!(matches!(err, ServiceError::InvalidFilter { ref field, .. } if field == "status"));
}

#[tokio::test]
async fn salary_filters_exclude_jobs_without_salary() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let mut priced = super::dummy_job("Python Developer", 1, false);

	priced.salary_min = Some(90_000);
	priced.salary_max = Some(130_000);

	let priced_id = priced.job_id;

	memory.insert_job(priced);
	memory.insert_job(super::dummy_job("Python Architect", 1, false));

	let requester = RequesterContext::anonymous();
	let filters =
		SearchFilterInput { salary_min: Some(80_000), ..SearchFilterInput::default() };
	let response = service
		.search(request_with("python", filters), &requester)
		.await
		.expect("Search failed.");

	assert_eq!(response.total_count, 1);
	assert_eq!(response.results[0].id, priced_id);

	let filters =
		SearchFilterInput { salary_max: Some(140_000), ..SearchFilterInput::default() };
	let response = service
		.search(request_with("python", filters), &requester)
		.await
		.expect("Search failed.");

	assert_eq!(response.total_count, 1);
	assert_eq!(response.results[0].id, priced_id);
}

#[tokio::test]
async fn salary_bounds_are_validated() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let requester = RequesterContext::anonymous();
	let filters = SearchFilterInput {
		salary_min: Some(100_000),
		salary_max: Some(50_000),
		..SearchFilterInput::default()
	};
	let err = service
		.search(request_with("python", filters), &requester)
		.await
		.expect_err("Expected reversed bounds to be rejected.");

	assert!(matches!(err, ServiceError::InvalidFilter { ref field, .. } if field == "salary_min"));

	let filters =
		SearchFilterInput { salary_max: Some(-1), ..SearchFilterInput::default() };
	let err = service
		.search(request_with("python", filters), &requester)
		.await
		.expect_err("Expected a negative bound to be rejected.");

	assert!(matches!(err, ServiceError::InvalidFilter { ref field, .. } if field == "salary_max"));
}

#[tokio::test]
async fn location_and_job_type_filters_narrow_structurally() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let mut berlin = super::dummy_job("Python Developer", 1, false);

	berlin.location = "Berlin, DE".to_string();

	let mut contract = super::dummy_job("Python Contractor", 1, false);

	contract.job_type = "contract".to_string();

	let berlin_id = berlin.job_id;
	let contract_id = contract.job_id;

	memory.insert_job(berlin);
	memory.insert_job(contract);
	memory.insert_job(super::dummy_job("Python Architect", 1, false));

	let requester = RequesterContext::anonymous();
	let filters =
		SearchFilterInput { location: Some("berlin".to_string()), ..SearchFilterInput::default() };
	let response = service
		.search(request_with("python", filters), &requester)
		.await
		.expect("Search failed.");

	assert_eq!(response.total_count, 1);
	assert_eq!(response.results[0].id, berlin_id);

	let filters =
		SearchFilterInput { job_type: Some("contract".to_string()), ..SearchFilterInput::default() };
	let response = service
		.search(request_with("python", filters), &requester)
		.await
		.expect("Search failed.");

	assert_eq!(response.total_count, 1);
	assert_eq!(response.results[0].id, contract_id);

	let filters =
		SearchFilterInput { job_type: Some("gig".to_string()), ..SearchFilterInput::default() };
	let err = service
		.search(request_with("python", filters), &requester)
		.await
		.expect_err("Expected an unknown job type to be rejected.");

	assert!(matches!(err, ServiceError::InvalidFilter { ref field, .. } if field == "job_type"));
}
