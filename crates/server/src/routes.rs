//! JSON API over the guided session service.
//!
//! - `GET  /api/catalog`
//! - `POST /api/sessions`                               start a guided session
//! - `GET  /api/sessions/{id}`
//! - `POST /api/sessions/{id}/advance`
//! - `POST /api/sessions/{id}/refresh`
//! - `POST /api/sessions/{id}/options/{option_id}`      toggle one option
//! - `POST /api/sessions/{id}/submit`                   validate and summarize
//! - `GET  /api/ops/kpis`
//! - `GET  /api/ops/board?sessionId=`
//! - `GET  /api/ops/issues`
//! - `GET  /api/ops/sessions/{id}/issues`
//! - `POST /api/ops/issues/{id}/fix`
//! - `POST /api/admin/reset`

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;
use vanguide_core::summary::{submission_summary_text, Summarizer};
use vanguide_core::{
    Catalog, DomainError, GuidedSessionInput, GuidedSessionService, GuidedSessionUpdate,
    GuidedSessionView, InterfaceError, Issue, IssueId, Kpis, OpsBoardPayload, OptionId, ResetAck,
    Session, SessionId, SubmissionResult,
};

use crate::health;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Shared handles for every route.
///
/// The service sits behind one async mutex; handlers release it before awaiting the
/// summarizer so a slow model call never blocks other sessions.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Mutex<GuidedSessionService>>,
    pub summarizer: Arc<dyn Summarizer>,
    pub summarizer_backed: bool,
}

impl AppState {
    pub fn new(
        service: GuidedSessionService,
        summarizer: Arc<dyn Summarizer>,
        summarizer_backed: bool,
    ) -> Self {
        Self { service: Arc::new(Mutex::new(service)), summarizer, summarizer_backed }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Interface error carried out of a handler.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn domain(error: DomainError, correlation_id: &str) -> Self {
        Self(vanguide_core::ApplicationError::from(error).into_interface(correlation_id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.clone()),
            InterfaceError::BadRequest { .. } => {
                (StatusCode::BAD_REQUEST, self.0.user_message().to_string())
            }
            InterfaceError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, self.0.user_message().to_string())
            }
            InterfaceError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.user_message().to_string())
            }
        };

        warn!(
            event_name = "api.request.failed",
            correlation_id = self.0.correlation_id(),
            status = status.as_u16(),
            error = %self.0,
            "request failed"
        );

        let mut response = (status, Json(ErrorBody { error: message })).into_response();
        if let Ok(value) = self.0.correlation_id().parse() {
            response.headers_mut().insert(CORRELATION_HEADER, value);
        }
        response
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub result: SubmissionResult,
    pub summary: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardQuery {
    pub session_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/catalog", get(get_catalog))
        .route("/api/sessions", post(start_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/advance", post(advance_session))
        .route("/api/sessions/{id}/refresh", post(refresh_session))
        .route("/api/sessions/{id}/options/{option_id}", post(toggle_option))
        .route("/api/sessions/{id}/submit", post(submit_session))
        .route("/api/ops/kpis", get(kpis))
        .route("/api/ops/board", get(ops_board))
        .route("/api/ops/issues", get(issue_list))
        .route("/api/ops/sessions/{id}/issues", get(issues_for_session))
        .route("/api/ops/issues/{id}/fix", post(apply_fix))
        .route("/api/admin/reset", post(reset_all))
        .with_state(state)
}

async fn get_catalog(State(state): State<AppState>) -> Json<Catalog> {
    let service = state.service.lock().await;
    Json(service.catalog().clone())
}

async fn start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<GuidedSessionInput>,
) -> Json<GuidedSessionView> {
    let correlation_id = correlation_id(&headers);
    let view = state.service.lock().await.start_session(input);
    info!(
        event_name = "api.session.started",
        correlation_id = %correlation_id,
        session_id = %view.session.id,
        "session started over http"
    );
    Json(view)
}

async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Session> {
    let correlation_id = correlation_id(&headers);
    let service = state.service.lock().await;
    let session = service
        .get_session(&SessionId(id))
        .map_err(|error| ApiError::domain(error, &correlation_id))?;
    Ok(Json(session.clone()))
}

async fn advance_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<GuidedSessionUpdate>,
) -> ApiResult<GuidedSessionView> {
    let correlation_id = correlation_id(&headers);
    let session_id = SessionId(id);
    let view = state
        .service
        .lock()
        .await
        .advance_session(&session_id, update)
        .map_err(|error| ApiError::domain(error, &correlation_id))?;

    info!(
        event_name = "api.session.advanced",
        correlation_id = %correlation_id,
        session_id = %session_id,
        step = %view.journey_state.step,
        "session advanced over http"
    );
    Ok(Json(view))
}

async fn refresh_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<GuidedSessionView> {
    let correlation_id = correlation_id(&headers);
    state
        .service
        .lock()
        .await
        .refresh_session(&SessionId(id))
        .map(Json)
        .map_err(|error| ApiError::domain(error, &correlation_id))
}

async fn toggle_option(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, option_id)): Path<(String, String)>,
) -> ApiResult<Session> {
    let correlation_id = correlation_id(&headers);
    state
        .service
        .lock()
        .await
        .toggle_option(&SessionId(id), &OptionId(option_id))
        .map(Json)
        .map_err(|error| ApiError::domain(error, &correlation_id))
}

async fn submit_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<SubmitResponse> {
    let correlation_id = correlation_id(&headers);
    let session_id = SessionId(id);

    let result = {
        let mut service = state.service.lock().await;
        service
            .submit_session(&session_id)
            .map_err(|error| ApiError::domain(error, &correlation_id))?
    };

    let summary =
        state.summarizer.summarize(&session_id, &submission_summary_text(&result)).await;
    info!(
        event_name = "api.session.submitted",
        correlation_id = %correlation_id,
        session_id = %session_id,
        status = result.status.as_str(),
        "session submitted over http"
    );
    Ok(Json(SubmitResponse { result, summary }))
}

async fn kpis(State(state): State<AppState>) -> Json<Kpis> {
    Json(state.service.lock().await.kpis())
}

async fn ops_board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Json<OpsBoardPayload> {
    let filter = query
        .session_id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(SessionId);
    Json(state.service.lock().await.ops_board(filter))
}

async fn issue_list(State(state): State<AppState>) -> Json<Vec<Issue>> {
    Json(state.service.lock().await.issue_list())
}

async fn issues_for_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Issue>> {
    Json(state.service.lock().await.issues_for_session(&SessionId(id)))
}

async fn apply_fix(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Issue> {
    let correlation_id = correlation_id(&headers);
    let issue_id = IssueId(id);
    let issue = state
        .service
        .lock()
        .await
        .apply_fix(&issue_id)
        .map_err(|error| ApiError::domain(error, &correlation_id))?;

    info!(
        event_name = "api.fix.applied",
        correlation_id = %correlation_id,
        session_id = %issue.session_id,
        issue_id = %issue_id,
        "fix applied over http"
    );
    Ok(Json(issue))
}

async fn reset_all(State(state): State<AppState>, headers: HeaderMap) -> Json<ResetAck> {
    let correlation_id = correlation_id(&headers);
    let ack = state.service.lock().await.reset_all();
    warn!(
        event_name = "api.admin.reset",
        correlation_id = %correlation_id,
        "state reset over http"
    );
    Json(ack)
}
