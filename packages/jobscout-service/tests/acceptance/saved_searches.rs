use uuid::Uuid;

use jobscout_domain::filters::SearchFilterInput;
use jobscout_service::{
	ExecuteSavedSearchRequest, RequesterContext, SavedSearchCreateRequest,
	SavedSearchUpdateRequest, SearchRequest, ServiceError,
};
use jobscout_testkit::MemoryStores;

fn create_request(name: &str, query: &str) -> SavedSearchCreateRequest {
	SavedSearchCreateRequest {
		name: name.to_string(),
		query: query.to_string(),
		filters: SearchFilterInput::default(),
	}
}

fn execute_request(saved_search_id: Uuid) -> ExecuteSavedSearchRequest {
	ExecuteSavedSearchRequest { saved_search_id, limit: None, offset: None }
}

fn update_request(saved_search_id: Uuid) -> SavedSearchUpdateRequest {
	SavedSearchUpdateRequest {
		saved_search_id,
		name: None,
		query: None,
		filters: None,
		is_active: None,
	}
}

#[tokio::test]
async fn executing_replays_the_stored_search() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let requester = RequesterContext::standard(Uuid::new_v4());

	memory.insert_job(super::dummy_job("Senior Python Developer", 3, true));
	memory.insert_job(super::dummy_job("Python Intern", 40, false));
	memory.insert_job(super::dummy_job("Java Developer", 1, false));

	let saved = service
		.create_saved_search(create_request("Python watch", "python"), &requester)
		.await
		.expect("Create failed.");
	let executed = service
		.execute_saved_search(execute_request(saved.saved_search_id), &requester)
		.await
		.expect("Execute failed.");
	let direct = service
		.search(
			SearchRequest {
				query: "python".to_string(),
				filters: SearchFilterInput::default(),
				limit: None,
				offset: None,
			},
			&requester,
		)
		.await
		.expect("Search failed.");

	let executed_ids: Vec<Uuid> = executed.results.iter().map(|job| job.id).collect();
	let direct_ids: Vec<Uuid> = direct.results.iter().map(|job| job.id).collect();

	assert_eq!(executed.total_count, direct.total_count);
	assert_eq!(executed_ids, direct_ids);
}

#[tokio::test]
async fn executing_stamps_last_executed_at() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let requester = RequesterContext::standard(Uuid::new_v4());
	let saved = service
		.create_saved_search(create_request("watch", "python"), &requester)
		.await
		.expect("Create failed.");

	assert!(saved.last_executed_at.is_none());

	service
		.execute_saved_search(execute_request(saved.saved_search_id), &requester)
		.await
		.expect("Execute failed.");

	let fetched = service
		.get_saved_search(saved.saved_search_id, &requester)
		.await
		.expect("Get failed.");

	assert!(fetched.last_executed_at.is_some());
}

#[tokio::test]
async fn duplicate_names_conflict_per_owner() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let requester = RequesterContext::standard(Uuid::new_v4());

	service
		.create_saved_search(create_request("watch", "python"), &requester)
		.await
		.expect("Create failed.");

	let err = service
		.create_saved_search(create_request("watch", "java"), &requester)
		.await
		.expect_err("Duplicate name should be rejected.");

	match err {
		ServiceError::Conflict { message } => assert!(message.contains("already exists")),
		other => panic!("Expected a conflict, got {other:?}."),
	}

	// The same name under a different owner is fine.
	service
		.create_saved_search(create_request("watch", "python"), &RequesterContext::standard(Uuid::new_v4()))
		.await
		.expect("Create under another owner failed.");
}

#[tokio::test]
async fn updates_revalidate_the_stored_search() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let requester = RequesterContext::standard(Uuid::new_v4());
	let alpha = service
		.create_saved_search(create_request("alpha", "python"), &requester)
		.await
		.expect("Create failed.");

	service
		.create_saved_search(create_request("beta", "java"), &requester)
		.await
		.expect("Create failed.");

	let err = service
		.update_saved_search(
			SavedSearchUpdateRequest {
				filters: Some(SearchFilterInput {
					salary_min: Some(100_000),
					salary_max: Some(50_000),
					..Default::default()
				}),
				..update_request(alpha.saved_search_id)
			},
			&requester,
		)
		.await
		.expect_err("Reversed bounds should be rejected.");

	assert!(matches!(err, ServiceError::InvalidFilter { ref field, .. } if field == "salary_min"));

	let err = service
		.update_saved_search(
			SavedSearchUpdateRequest {
				name: Some("beta".to_string()),
				..update_request(alpha.saved_search_id)
			},
			&requester,
		)
		.await
		.expect_err("Renaming onto a sibling should conflict.");

	assert!(matches!(err, ServiceError::Conflict { .. }));

	let renamed = service
		.update_saved_search(
			SavedSearchUpdateRequest {
				name: Some("gamma".to_string()),
				..update_request(alpha.saved_search_id)
			},
			&requester,
		)
		.await
		.expect("Rename failed.");

	assert_eq!(renamed.name, "gamma");
	assert!(renamed.updated_at >= renamed.created_at);
}

#[tokio::test]
async fn deleting_then_fetching_is_not_found() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let requester = RequesterContext::standard(Uuid::new_v4());
	let saved = service
		.create_saved_search(create_request("watch", "python"), &requester)
		.await
		.expect("Create failed.");

	service
		.delete_saved_search(saved.saved_search_id, &requester)
		.await
		.expect("Delete failed.");

	let err = service
		.get_saved_search(saved.saved_search_id, &requester)
		.await
		.expect_err("Deleted search should be gone.");

	assert!(matches!(err, ServiceError::NotFound { .. }));

	let err = service
		.delete_saved_search(saved.saved_search_id, &requester)
		.await
		.expect_err("Second delete should fail.");

	assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn anonymous_callers_are_rejected() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let anonymous = RequesterContext::anonymous();

	let err = service
		.create_saved_search(create_request("watch", "python"), &anonymous)
		.await
		.expect_err("Anonymous create should be rejected.");

	assert!(matches!(err, ServiceError::Forbidden { .. }));

	let err = service
		.list_saved_searches(&anonymous)
		.await
		.expect_err("Anonymous list should be rejected.");

	assert!(matches!(err, ServiceError::Forbidden { .. }));

	let err = service
		.execute_saved_search(execute_request(Uuid::new_v4()), &anonymous)
		.await
		.expect_err("Anonymous execute should be rejected.");

	assert!(matches!(err, ServiceError::Forbidden { .. }));
}

#[tokio::test]
async fn owners_never_see_each_other() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let owner = RequesterContext::standard(Uuid::new_v4());
	let stranger = RequesterContext::standard(Uuid::new_v4());
	let saved = service
		.create_saved_search(create_request("watch", "python"), &owner)
		.await
		.expect("Create failed.");

	let err = service
		.get_saved_search(saved.saved_search_id, &stranger)
		.await
		.expect_err("Foreign fetch should miss.");

	assert!(matches!(err, ServiceError::NotFound { .. }));

	let listed = service.list_saved_searches(&stranger).await.expect("List failed.");

	assert!(listed.saved_searches.is_empty());
}
