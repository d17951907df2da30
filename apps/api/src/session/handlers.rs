use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::information::ExtractedRecord;
use crate::ingest::{process_uploads, read_upload_form, UploadOutcome};
use crate::presentation::{render_record, ResumeView};
use crate::session::registry::SessionHandle;
use crate::session::SessionStore;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
}

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub file_names: Vec<String>,
    pub selected: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&SessionStore> for ResumeListResponse {
    fn from(store: &SessionStore) -> Self {
        Self {
            file_names: store.file_names().to_vec(),
            selected: store.selected().map(String::from),
            created_at: store.created_at(),
        }
    }
}

#[derive(Deserialize)]
pub struct SelectRequest {
    pub file_name: String,
}

#[derive(Serialize)]
pub struct ResumeResponse {
    pub file_name: String,
    pub record: ExtractedRecord,
    pub view: ResumeView,
}

fn find_session(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionCreatedResponse>) {
    let session_id = state.sessions.create();
    (StatusCode::CREATED, Json(SessionCreatedResponse { session_id }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.end(id) {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/uploads
///
/// Per-file failures come back as notices in a 200 response; only a missing
/// key or an unreadable multipart body fails the request.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadOutcome>, AppError> {
    let session = find_session(&state, id)?;
    let form = read_upload_form(multipart).await?;
    let api_key = form.require_api_key()?.clone();

    let mut store = session.lock().await;
    let outcome = process_uploads(&mut store, form.documents, state.llm.as_ref(), &api_key).await;
    store.set_last_notices(outcome.notices.clone());
    Ok(Json(outcome))
}

/// GET /api/v1/sessions/:id/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let session = find_session(&state, id)?;
    let store = session.lock().await;
    Ok(Json(ResumeListResponse::from(&*store)))
}

/// PUT /api/v1/sessions/:id/selection
pub async fn handle_select_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let session = find_session(&state, id)?;
    let mut store = session.lock().await;
    if !store.select(&req.file_name) {
        return Err(AppError::NotFound(format!(
            "Resume {} not found in session",
            req.file_name
        )));
    }
    Ok(Json(ResumeListResponse::from(&*store)))
}

/// GET /api/v1/sessions/:id/resumes/:file_name
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path((id, file_name)): Path<(Uuid, String)>,
) -> Result<Json<ResumeResponse>, AppError> {
    let session = find_session(&state, id)?;
    let record = session
        .lock()
        .await
        .get(&file_name)
        .ok_or_else(|| AppError::NotFound(format!("Resume {file_name} not found in session")))?;

    let view = render_record(&file_name, &record);
    Ok(Json(ResumeResponse {
        file_name,
        record: (*record).clone(),
        view,
    }))
}
