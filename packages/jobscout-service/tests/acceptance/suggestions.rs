use std::time::Duration as StdDuration;

use time::OffsetDateTime;
use uuid::Uuid;

use jobscout_domain::suggest::SuggestionKind;
use jobscout_service::RequesterContext;
use jobscout_storage::models::PopularSearchTerm;
use jobscout_testkit::MemoryStores;

fn popular_term(term: &str, search_count: i64) -> PopularSearchTerm {
	let now = OffsetDateTime::now_utc();

	PopularSearchTerm {
		term: term.to_string(),
		search_count,
		first_seen_at: now,
		last_seen_at: now,
	}
}

#[tokio::test]
async fn autocomplete_merges_sources_in_priority_order() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);

	memory.insert_term(popular_term("python developer", 12));
	memory.insert_term(popular_term("python scripting", 3));

	let mut titled = super::dummy_job("Python Developer", 1, false);

	titled.location = "Remote".to_string();

	let mut located = super::dummy_job("Senior Python Engineer", 1, false);

	located.location = "Python Bay".to_string();

	memory.insert_job(titled);
	memory.insert_job(located);

	let response = service.autocomplete("python", 10).await.expect("Autocomplete failed.");
	let suggestions = response.suggestions;

	// The title that duplicates the top popular term is dropped; the
	// popular entry carries its count.
	assert_eq!(suggestions.len(), 4);
	assert_eq!(suggestions[0].kind, SuggestionKind::Popular);
	assert_eq!(suggestions[0].text, "python developer");
	assert_eq!(suggestions[0].count, Some(12));
	assert_eq!(suggestions[1].text, "python scripting");
	assert_eq!(suggestions[2].kind, SuggestionKind::JobTitle);
	assert_eq!(suggestions[2].text, "Senior Python Engineer");
	assert_eq!(suggestions[3].kind, SuggestionKind::Location);
	assert_eq!(suggestions[3].text, "Python Bay");
}

#[tokio::test]
async fn autocomplete_needs_two_effective_characters() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);

	memory.insert_term(popular_term("python", 10));

	for input in ["p", "  p  ", ""] {
		let response = service.autocomplete(input, 10).await.expect("Autocomplete failed.");

		assert!(response.suggestions.is_empty(), "input {input:?}");
	}

	let response = service.autocomplete("python", 0).await.expect("Autocomplete failed.");

	assert!(response.suggestions.is_empty());
}

#[tokio::test]
async fn autocomplete_excludes_inactive_jobs() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let mut closed = super::dummy_job("Python Architect", 1, false);

	closed.status = "closed".to_string();

	memory.insert_job(closed);
	memory.insert_job(super::dummy_job("Python Developer", 1, false));

	let response = service.autocomplete("python", 10).await.expect("Autocomplete failed.");
	let texts: Vec<&str> =
		response.suggestions.iter().map(|suggestion| suggestion.text.as_str()).collect();

	assert_eq!(texts, vec!["Python Developer"]);
}

#[tokio::test]
async fn similar_terms_rank_by_similarity_and_skip_the_exact_match() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);

	memory.insert_term(popular_term("python", 10));
	memory.insert_term(popular_term("pythons", 2));
	memory.insert_term(popular_term("java", 5));

	let response = service.suggest_similar("python", 10).await.expect("Suggest failed.");

	assert_eq!(response.suggestions, vec!["pythons".to_string()]);

	let response = service.suggest_similar("pythn", 10).await.expect("Suggest failed.");

	assert_eq!(response.suggestions, vec!["python".to_string(), "pythons".to_string()]);
}

#[tokio::test]
async fn missing_similarity_support_falls_back_to_containment() {
	let memory = MemoryStores::with_capabilities(true, false);
	let service = super::service(&memory);

	memory.insert_term(popular_term("python", 10));
	memory.insert_term(popular_term("python developer", 5));
	memory.insert_term(popular_term("java", 1));

	let response = service.suggest_similar("python", 10).await.expect("Suggest failed.");

	assert_eq!(response.suggestions, vec!["python developer".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_term_increments_all_land() {
	let memory = MemoryStores::new();
	let stores = memory.stores();
	let now = OffsetDateTime::now_utc();
	let mut handles = Vec::new();

	for _ in 0..20 {
		let terms = stores.terms.clone();

		handles.push(tokio::spawn(async move {
			terms.increment_term("python".to_string(), now).await
		}));
	}

	for handle in handles {
		handle.await.expect("Increment task panicked.").expect("Increment failed.");
	}

	assert_eq!(memory.term_search_count("python"), Some(20));
}

#[tokio::test]
async fn searches_feed_term_popularity() {
	let memory = MemoryStores::new();
	let service = super::service(&memory);
	let requester = RequesterContext::standard(Uuid::new_v4());

	service
		.search(
			jobscout_service::SearchRequest {
				query: "  Python  ".to_string(),
				filters: Default::default(),
				limit: None,
				offset: None,
			},
			&requester,
		)
		.await
		.expect("Search failed.");

	// The recorder runs on a spawned task; give it a bounded window.
	for _ in 0..100 {
		if memory.term_search_count("python").is_some() {
			break;
		}

		tokio::time::sleep(StdDuration::from_millis(5)).await;
	}

	assert_eq!(memory.term_search_count("python"), Some(1));
}
