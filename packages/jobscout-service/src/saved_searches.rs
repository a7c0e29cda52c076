use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use jobscout_domain::filters::{self, SearchFilterInput};
use jobscout_storage::models::SavedSearch;

use crate::{
	RequesterContext, SearchRequest, SearchResponse, SearchService, ServiceError, ServiceResult,
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SavedSearchCreateRequest {
	pub name: String,
	#[serde(default)]
	pub query: String,
	#[serde(default)]
	pub filters: SearchFilterInput,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SavedSearchUpdateRequest {
	pub saved_search_id: Uuid,
	pub name: Option<String>,
	pub query: Option<String>,
	pub filters: Option<SearchFilterInput>,
	pub is_active: Option<bool>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExecuteSavedSearchRequest {
	pub saved_search_id: Uuid,
	pub limit: Option<i64>,
	pub offset: Option<i64>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SavedSearchView {
	pub saved_search_id: Uuid,
	pub name: String,
	pub query: String,
	pub filters: serde_json::Value,
	pub is_active: bool,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub last_executed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SavedSearchesResponse {
	pub saved_searches: Vec<SavedSearchView>,
}

impl SearchService {
	pub async fn create_saved_search(
		&self,
		req: SavedSearchCreateRequest,
		requester: &RequesterContext,
	) -> ServiceResult<SavedSearchView> {
		let owner_id = identified(requester)?;
		let name = req.name.trim();

		if name.is_empty() {
			return Err(ServiceError::InvalidFilter {
				field: "name".to_string(),
				message: "name must be non-empty.".to_string(),
			});
		}

		// Shape check only; the raw filter input is what gets persisted,
		// so the owner's capability at execution time decides visibility.
		filters::normalize(&req.query, &req.filters, requester.capability.is_elevated())?;

		let now = OffsetDateTime::now_utc();
		let saved = SavedSearch {
			saved_search_id: Uuid::new_v4(),
			owner_id,
			name: name.to_string(),
			query: req.query.trim().to_string(),
			filters: serde_json::to_value(&req.filters).unwrap_or(serde_json::Value::Null),
			is_active: true,
			created_at: now,
			updated_at: now,
			last_executed_at: None,
		};
		let saved = self.stores.saved_searches.create(saved).await?;

		Ok(view(saved))
	}

	pub async fn list_saved_searches(
		&self,
		requester: &RequesterContext,
	) -> ServiceResult<SavedSearchesResponse> {
		let owner_id = identified(requester)?;
		let saved = self.stores.saved_searches.list(owner_id).await?;

		Ok(SavedSearchesResponse { saved_searches: saved.into_iter().map(view).collect() })
	}

	pub async fn get_saved_search(
		&self,
		saved_search_id: Uuid,
		requester: &RequesterContext,
	) -> ServiceResult<SavedSearchView> {
		let owner_id = identified(requester)?;
		let saved = self.stores.saved_searches.fetch(owner_id, saved_search_id).await?;

		Ok(view(saved))
	}

	pub async fn update_saved_search(
		&self,
		req: SavedSearchUpdateRequest,
		requester: &RequesterContext,
	) -> ServiceResult<SavedSearchView> {
		let owner_id = identified(requester)?;
		let mut saved = self.stores.saved_searches.fetch(owner_id, req.saved_search_id).await?;

		if let Some(name) = req.name {
			let name = name.trim().to_string();

			if name.is_empty() {
				return Err(ServiceError::InvalidFilter {
					field: "name".to_string(),
					message: "name must be non-empty.".to_string(),
				});
			}

			saved.name = name;
		}
		if let Some(query) = req.query {
			saved.query = query.trim().to_string();
		}
		if let Some(input) = &req.filters {
			saved.filters = serde_json::to_value(input).unwrap_or(serde_json::Value::Null);
		}
		if let Some(is_active) = req.is_active {
			saved.is_active = is_active;
		}

		let input = stored_filters(&saved.filters)?;

		filters::normalize(&saved.query, &input, requester.capability.is_elevated())?;

		saved.updated_at = OffsetDateTime::now_utc();

		let saved = self.stores.saved_searches.update(saved).await?;

		Ok(view(saved))
	}

	pub async fn delete_saved_search(
		&self,
		saved_search_id: Uuid,
		requester: &RequesterContext,
	) -> ServiceResult<()> {
		let owner_id = identified(requester)?;

		self.stores.saved_searches.delete(owner_id, saved_search_id).await?;

		Ok(())
	}

	/// Re-runs the stored query and filters through the ordinary search
	/// pipeline, then stamps `last_executed_at`. The stamp is best-effort;
	/// the search result is the contract.
	pub async fn execute_saved_search(
		&self,
		req: ExecuteSavedSearchRequest,
		requester: &RequesterContext,
	) -> ServiceResult<SearchResponse> {
		let owner_id = identified(requester)?;
		let saved = self.stores.saved_searches.fetch(owner_id, req.saved_search_id).await?;
		let input = stored_filters(&saved.filters)?;
		let response = self
			.search(
				SearchRequest {
					query: saved.query,
					filters: input,
					limit: req.limit,
					offset: req.offset,
				},
				requester,
			)
			.await?;
		let now = OffsetDateTime::now_utc();

		if let Err(err) =
			self.stores.saved_searches.touch_executed(owner_id, req.saved_search_id, now).await
		{
			warn!(
				error = %err,
				saved_search_id = %req.saved_search_id,
				"Failed to stamp saved search execution.",
			);
		}

		Ok(response)
	}
}

pub(crate) fn identified(requester: &RequesterContext) -> ServiceResult<Uuid> {
	requester.user_id.ok_or_else(|| ServiceError::Forbidden {
		message: "This operation requires an identified requester.".to_string(),
	})
}

pub(crate) fn stored_filters(value: &serde_json::Value) -> ServiceResult<SearchFilterInput> {
	serde_json::from_value(value.clone()).map_err(|err| ServiceError::InvalidFilter {
		field: "filters".to_string(),
		message: err.to_string(),
	})
}

fn view(saved: SavedSearch) -> SavedSearchView {
	SavedSearchView {
		saved_search_id: saved.saved_search_id,
		name: saved.name,
		query: saved.query,
		filters: saved.filters,
		is_active: saved.is_active,
		created_at: saved.created_at,
		updated_at: saved.updated_at,
		last_executed_at: saved.last_executed_at,
	}
}
