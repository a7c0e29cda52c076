use time::OffsetDateTime;

use crate::{RequesterContext, SearchService, ServiceError, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
	pub query: String,
	pub filters: serde_json::Value,
	pub result_count: i64,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HistoryResponse {
	pub entries: Vec<HistoryEntry>,
}

impl SearchService {
	pub async fn user_history(
		&self,
		requester: &RequesterContext,
		limit: i64,
	) -> ServiceResult<HistoryResponse> {
		let Some(user_id) = requester.user_id else {
			return Err(ServiceError::Forbidden {
				message: "History requires an identified requester.".to_string(),
			});
		};
		if limit <= 0 {
			return Ok(HistoryResponse { entries: Vec::new() });
		}

		let limit = limit.min(self.cfg.search.max_limit);
		let entries = self.stores.history.user_history(user_id, limit).await?;

		Ok(HistoryResponse {
			entries: entries
				.into_iter()
				.map(|entry| HistoryEntry {
					query: entry.query,
					filters: entry.filters,
					result_count: entry.result_count,
					created_at: entry.created_at,
				})
				.collect(),
		})
	}
}
