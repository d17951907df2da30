//! Browser UI: one server-rendered page per session.
//!
//! Sidebar: masked API key input and the upload control. Main area: a
//! selector over processed file names and the selected record.

use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::{
    process_uploads, read_upload_form, Notice, NoticeLevel, MISSING_KEY_MESSAGE,
};
use crate::presentation::{render_record, ResumeView};
use crate::session::SessionStore;
use crate::state::AppState;

pub struct SelectOption {
    pub name: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct SessionPage<'a> {
    pub session_id: Uuid,
    pub options: Vec<SelectOption>,
    pub notices: &'a [Notice],
    pub view: Option<ResumeView>,
}

impl<'a> SessionPage<'a> {
    pub fn build(session_id: Uuid, store: &'a SessionStore) -> Self {
        let selected = store.selected();
        let options = store
            .file_names()
            .iter()
            .map(|name| SelectOption {
                name: name.clone(),
                selected: Some(name.as_str()) == selected,
            })
            .collect();
        let view = store
            .selected_record()
            .map(|(name, record)| render_record(name, &record));

        Self {
            session_id,
            options,
            notices: store.last_notices(),
            view,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub resume: Option<String>,
}

fn session_path(id: Uuid) -> String {
    format!("/sessions/{id}")
}

/// GET /
///
/// Starts a fresh session and sends the browser to its page.
pub async fn handle_index(State(state): State<AppState>) -> Redirect {
    let id = state.sessions.create();
    Redirect::to(&session_path(id))
}

/// GET /sessions/:id
///
/// Renders the page; `?resume=` moves the selection first. Unknown sessions
/// (ended, or lost to a restart) start over at `/`.
pub async fn handle_session_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get(id) else {
        return Ok(Redirect::to("/").into_response());
    };

    let mut store = session.lock().await;
    if let Some(name) = query.resume.as_deref() {
        store.select(name);
    }

    let html = SessionPage::build(id, &store).render()?;
    Ok(Html(html).into_response())
}

/// POST /sessions/:id/uploads
///
/// Processes the submitted files, keeps the notices for the next render and
/// redirects back to the page.
pub async fn handle_page_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let Some(session) = state.sessions.get(id) else {
        return Ok(Redirect::to("/"));
    };

    let form = read_upload_form(multipart).await?;
    let mut store = session.lock().await;

    let notices = match form.api_key.as_ref() {
        None => vec![Notice::general(NoticeLevel::Warning, MISSING_KEY_MESSAGE)],
        Some(api_key) => {
            process_uploads(&mut store, form.documents, state.llm.as_ref(), api_key)
                .await
                .notices
        }
    };
    store.set_last_notices(notices);

    Ok(Redirect::to(&session_path(id)))
}

/// POST /sessions/:id/end
pub async fn handle_page_end(State(state): State<AppState>, Path(id): Path<Uuid>) -> Redirect {
    state.sessions.end(id);
    Redirect::to("/")
}
