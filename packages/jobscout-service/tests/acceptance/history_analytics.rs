use std::time::Duration as StdDuration;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use jobscout_service::{RequesterContext, SearchRequest, ServiceError};
use jobscout_storage::models::SearchHistoryEntry;
use jobscout_testkit::MemoryStores;

fn history_entry(
	user_id: Option<Uuid>,
	query: &str,
	result_count: i64,
	age_days: i64,
) -> SearchHistoryEntry {
	SearchHistoryEntry {
		history_id: Uuid::new_v4(),
		user_id,
		query: query.to_string(),
		filters: serde_json::json!({}),
		result_count,
		client_ip: None,
		created_at: OffsetDateTime::now_utc() - Duration::days(age_days),
	}
}

async fn wait_for_entries(memory: &MemoryStores, expected: usize) {
	for _ in 0..100 {
		if memory.history_entries().len() >= expected {
			return;
		}

		tokio::time::sleep(StdDuration::from_millis(5)).await;
	}
}

#[tokio::test]
async fn searches_append_history_for_every_caller() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let user_id = Uuid::new_v4();
	let request = |query: &str| SearchRequest {
		query: query.to_string(),
		filters: Default::default(),
		limit: None,
		offset: None,
	};

	service
		.search(request("Python"), &RequesterContext::standard(user_id))
		.await
		.expect("Search failed.");
	wait_for_entries(&memory, 1).await;

	let entries = memory.history_entries();

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].user_id, Some(user_id));
	assert_eq!(entries[0].query, "Python");
	assert_eq!(entries[0].result_count, 0);

	service.search(request("java"), &RequesterContext::anonymous()).await.expect("Search failed.");
	wait_for_entries(&memory, 2).await;

	let entries = memory.history_entries();

	assert_eq!(entries.len(), 2);
	assert!(entries.iter().any(|entry| entry.user_id.is_none()));

	// Each user only ever reads their own slice.
	let response = service
		.user_history(&RequesterContext::standard(user_id), 10)
		.await
		.expect("History failed.");

	assert_eq!(response.entries.len(), 1);
	assert_eq!(response.entries[0].query, "Python");
}

#[tokio::test]
async fn history_requires_an_identified_requester() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let err = service
		.user_history(&RequesterContext::anonymous(), 10)
		.await
		.expect_err("Anonymous history should be rejected.");

	assert!(matches!(err, ServiceError::Forbidden { .. }));
}

#[tokio::test]
async fn user_history_is_capped_and_newest_first() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let user_id = Uuid::new_v4();

	for age in 1..=5 {
		memory.insert_history(history_entry(Some(user_id), &format!("q{age}"), 0, age));
	}

	let requester = RequesterContext::standard(user_id);
	let response = service.user_history(&requester, 3).await.expect("History failed.");
	let queries: Vec<&str> =
		response.entries.iter().map(|entry| entry.query.as_str()).collect();

	assert_eq!(queries, vec!["q1", "q2", "q3"]);

	let response = service.user_history(&requester, 0).await.expect("History failed.");

	assert!(response.entries.is_empty());
}

#[tokio::test]
async fn statistics_are_windowed_and_elevated_only() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let user_id = Uuid::new_v4();

	memory.insert_history(history_entry(Some(user_id), "Python", 5, 1));
	memory.insert_history(history_entry(Some(user_id), " python ", 3, 2));
	memory.insert_history(history_entry(None, "java", 0, 3));
	memory.insert_history(history_entry(Some(user_id), "old", 7, 40));

	let err = service
		.statistics(&RequesterContext::standard(user_id), None)
		.await
		.expect_err("Standard capability should be rejected.");

	assert!(matches!(err, ServiceError::Forbidden { .. }));

	let elevated = RequesterContext::elevated(user_id);
	let response = service.statistics(&elevated, None).await.expect("Statistics failed.");

	assert_eq!(response.total_searches, 3);
	assert_eq!(response.unique_queries, 2);
	assert!((response.average_result_count - 8.0 / 3.0).abs() < 1e-9);
	assert_eq!(response.distinct_searching_users, 1);
	assert_eq!(response.window_days, 30);

	let response = service.statistics(&elevated, Some(2)).await.expect("Statistics failed.");

	assert_eq!(response.total_searches, 1);
	assert!((response.average_result_count - 5.0).abs() < 1e-9);
	assert_eq!(response.window_days, 2);
}

#[tokio::test]
async fn popular_terms_normalize_and_respect_the_window() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);

	memory.insert_history(history_entry(None, "Python", 4, 1));
	memory.insert_history(history_entry(None, "python  ", 2, 2));
	memory.insert_history(history_entry(None, "a", 1, 1));
	memory.insert_history(history_entry(None, "golang", 3, 10));
	memory.insert_history(history_entry(None, "Java", 0, 3));

	let response = service.popular_terms(10, None).await.expect("Popular terms failed.");
	let terms: Vec<(&str, i64)> =
		response.terms.iter().map(|entry| (entry.term.as_str(), entry.count)).collect();

	// Default window is a week; variants of the same query collapse and
	// single-character noise is dropped.
	assert_eq!(terms, vec![("python", 2), ("java", 1)]);

	let response = service.popular_terms(10, Some(30)).await.expect("Popular terms failed.");
	let terms: Vec<(&str, i64)> =
		response.terms.iter().map(|entry| (entry.term.as_str(), entry.count)).collect();

	assert_eq!(terms, vec![("python", 2), ("java", 1), ("golang", 1)]);
}
