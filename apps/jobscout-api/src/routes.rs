use axum::{
	Json, Router,
	extract::{Query, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use jobscout_service::{
	AlertCreateRequest, AlertFrequency, AlertToggleResponse, AlertUpdateRequest, AlertView,
	AlertsResponse, Capability, ExecuteSavedSearchRequest, HistoryResponse, PopularTermsResponse,
	ProcessDueAlertsResponse, RequesterContext, SavedSearchCreateRequest, SavedSearchUpdateRequest,
	SavedSearchView, SavedSearchesResponse, SearchRequest, SearchResponse, ServiceError,
	SimilarTermsResponse, StatisticsResponse, SuggestionsResponse,
};

use crate::state::AppState;

/// Set by the fronting proxy after authentication; absent for anonymous
/// traffic.
const USER_ID_HEADER: &str = "x-jobscout-user-id";
const ROLE_HEADER: &str = "x-jobscout-role";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

const DEFAULT_SUGGEST_LIMIT: i64 = 10;
const DEFAULT_POPULAR_TERMS_LIMIT: i64 = 10;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.route("/v1/suggest/autocomplete", get(autocomplete))
		.route("/v1/suggest/similar", get(suggest_similar))
		.route("/v1/history", get(history))
		.route("/v1/popular_terms", get(popular_terms))
		.route("/v1/saved_searches/create", post(create_saved_search))
		.route("/v1/saved_searches/list", get(list_saved_searches))
		.route("/v1/saved_searches/get", get(get_saved_search))
		.route("/v1/saved_searches/update", post(update_saved_search))
		.route("/v1/saved_searches/delete", post(delete_saved_search))
		.route("/v1/saved_searches/execute", post(execute_saved_search))
		.route("/v1/alerts/create", post(create_alert))
		.route("/v1/alerts/list", get(list_alerts))
		.route("/v1/alerts/get", get(get_alert))
		.route("/v1/alerts/update", post(update_alert))
		.route("/v1/alerts/delete", post(delete_alert))
		.route("/v1/alerts/toggle", post(toggle_alert))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/statistics", get(statistics))
		.route("/v1/admin/process_due_alerts", post(process_due_alerts))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.search(payload, &requester).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct SuggestParams {
	#[serde(default)]
	q: String,
	limit: Option<i64>,
}

async fn autocomplete(
	State(state): State<AppState>,
	Query(params): Query<SuggestParams>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
	let limit = params.limit.unwrap_or(DEFAULT_SUGGEST_LIMIT);
	let response = state.service.autocomplete(&params.q, limit).await?;

	Ok(Json(response))
}

async fn suggest_similar(
	State(state): State<AppState>,
	Query(params): Query<SuggestParams>,
) -> Result<Json<SimilarTermsResponse>, ApiError> {
	let limit = params.limit.unwrap_or(DEFAULT_SUGGEST_LIMIT);
	let response = state.service.suggest_similar(&params.q, limit).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
	limit: Option<i64>,
}

async fn history(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
	let requester = requester(&headers)?;
	let limit = params.limit.unwrap_or(state.service.cfg.search.default_limit);
	let response = state.service.user_history(&requester, limit).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct PopularTermsParams {
	limit: Option<i64>,
	window_days: Option<i64>,
}

async fn popular_terms(
	State(state): State<AppState>,
	Query(params): Query<PopularTermsParams>,
) -> Result<Json<PopularTermsResponse>, ApiError> {
	let limit = params.limit.unwrap_or(DEFAULT_POPULAR_TERMS_LIMIT);
	let response = state.service.popular_terms(limit, params.window_days).await?;

	Ok(Json(response))
}

async fn create_saved_search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SavedSearchCreateRequest>,
) -> Result<Json<SavedSearchView>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.create_saved_search(payload, &requester).await?;

	Ok(Json(response))
}

async fn list_saved_searches(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<SavedSearchesResponse>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.list_saved_searches(&requester).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct IdParams {
	id: Uuid,
}

async fn get_saved_search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<IdParams>,
) -> Result<Json<SavedSearchView>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.get_saved_search(params.id, &requester).await?;

	Ok(Json(response))
}

async fn update_saved_search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SavedSearchUpdateRequest>,
) -> Result<Json<SavedSearchView>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.update_saved_search(payload, &requester).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct SavedSearchDeleteRequest {
	saved_search_id: Uuid,
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
	deleted: bool,
}

async fn delete_saved_search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SavedSearchDeleteRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
	let requester = requester(&headers)?;

	state.service.delete_saved_search(payload.saved_search_id, &requester).await?;

	Ok(Json(DeletedResponse { deleted: true }))
}

async fn execute_saved_search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<ExecuteSavedSearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.execute_saved_search(payload, &requester).await?;

	Ok(Json(response))
}

async fn create_alert(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<AlertCreateRequest>,
) -> Result<Json<AlertView>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.create_alert(payload, &requester).await?;

	Ok(Json(response))
}

async fn list_alerts(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<AlertsResponse>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.list_alerts(&requester).await?;

	Ok(Json(response))
}

async fn get_alert(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<IdParams>,
) -> Result<Json<AlertView>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.get_alert(params.id, &requester).await?;

	Ok(Json(response))
}

async fn update_alert(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<AlertUpdateRequest>,
) -> Result<Json<AlertView>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.update_alert(payload, &requester).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct AlertDeleteRequest {
	alert_id: Uuid,
}

async fn delete_alert(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<AlertDeleteRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
	let requester = requester(&headers)?;

	state.service.delete_alert(payload.alert_id, &requester).await?;

	Ok(Json(DeletedResponse { deleted: true }))
}

#[derive(Debug, Deserialize)]
struct AlertToggleRequest {
	alert_id: Uuid,
}

async fn toggle_alert(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<AlertToggleRequest>,
) -> Result<Json<AlertToggleResponse>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.toggle_alert(payload.alert_id, &requester).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct StatisticsParams {
	window_days: Option<i64>,
}

async fn statistics(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<StatisticsParams>,
) -> Result<Json<StatisticsResponse>, ApiError> {
	let requester = requester(&headers)?;
	let response = state.service.statistics(&requester, params.window_days).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct ProcessDueAlertsParams {
	frequency: Option<String>,
}

async fn process_due_alerts(
	State(state): State<AppState>,
	Query(params): Query<ProcessDueAlertsParams>,
) -> Result<Json<ProcessDueAlertsResponse>, ApiError> {
	let frequency = match params.frequency.as_deref() {
		None | Some("") => None,
		Some(value) => Some(AlertFrequency::parse(value).ok_or_else(|| {
			json_error(
				StatusCode::BAD_REQUEST,
				"invalid_parameter",
				format!("Unknown alert frequency {value:?}."),
				Some(vec!["frequency".to_string()]),
			)
		})?),
	};
	let response = state.service.process_due_alerts(frequency).await?;

	Ok(Json(response))
}

/// Builds the requester context from proxy-set identity headers. A header
/// that is present but unparseable is a hard error rather than a silent
/// downgrade to anonymous.
fn requester(headers: &HeaderMap) -> Result<RequesterContext, ApiError> {
	let user_id = match headers.get(USER_ID_HEADER) {
		None => None,
		Some(value) => {
			let text = value.to_str().map_err(|_| bad_header(USER_ID_HEADER))?;

			Some(Uuid::parse_str(text.trim()).map_err(|_| bad_header(USER_ID_HEADER))?)
		},
	};
	let capability = match headers.get(ROLE_HEADER) {
		None => Capability::Standard,
		Some(value) => match value.to_str().map_err(|_| bad_header(ROLE_HEADER))?.trim() {
			"" | "standard" => Capability::Standard,
			"elevated" => Capability::Elevated,
			_ => return Err(bad_header(ROLE_HEADER)),
		},
	};
	let client_ip = headers
		.get(FORWARDED_FOR_HEADER)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(',').next())
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty());

	Ok(RequesterContext { user_id, capability, client_ip })
}

fn bad_header(name: &str) -> ApiError {
	json_error(
		StatusCode::BAD_REQUEST,
		"invalid_header",
		format!("Header {name} could not be parsed."),
		None,
	)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError { status, error_code: code.to_string(), message: message.into(), fields }
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidFilter { field, message } => {
				json_error(StatusCode::BAD_REQUEST, "invalid_filter", message, Some(vec![field]))
			},
			ServiceError::Forbidden { message } => {
				json_error(StatusCode::FORBIDDEN, "forbidden", message, None)
			},
			ServiceError::NotFound { message } => {
				json_error(StatusCode::NOT_FOUND, "not_found", message, None)
			},
			ServiceError::Conflict { message } => {
				json_error(StatusCode::CONFLICT, "conflict", message, None)
			},
			ServiceError::Storage { message } => {
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage", message, None)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			fields: self.fields,
		};

		(self.status, Json(body)).into_response()
	}
}
