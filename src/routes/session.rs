use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::read_upload;
use crate::{
    error::AppError,
    services::{
        session::{self, Notice, Rejection, SessionSnapshot},
        tabular,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(current_session).delete(close_session))
        .route("/session/upload", post(upload_local))
        .route("/session/remote", post(upload_remote))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    notice: Notice,
    session: SessionSnapshot,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = self.error.status();
        tracing::warn!("Upload rejected: {}", self.error);

        let body = Json(json!({
            "error": self.error.to_string(),
            "notice": self.notice,
        }));

        (status, body).into_response()
    }
}

impl From<AppError> for Rejection {
    fn from(error: AppError) -> Self {
        let notice = match &error {
            AppError::Busy => Notice::busy(),
            _ => Notice::remote_failure(),
        };
        Rejection { error, notice }
    }
}

async fn current_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .session
        .lock()
        .current()
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No file has been analyzed yet".to_string()))
}

async fn close_session(State(state): State<Arc<AppState>>) -> StatusCode {
    if let Some(snapshot) = state.session.lock().clear() {
        tracing::info!("Closed session for {}", snapshot.file_name);
    }
    StatusCode::NO_CONTENT
}

async fn upload_local(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, Rejection> {
    let upload = read_upload(multipart).await?;

    let file_name = upload.file_name.clone();
    let accepted = state.config.accepted_extensions.clone();
    let report = tokio::task::spawn_blocking(move || {
        session::analyze_local(&upload.file_name, upload.data, &accepted)
    })
    .await
    .map_err(AppError::from)??;

    // The lock only covers the swap; analysis above runs without it.
    let mut session = state.session.lock();
    let notice = session.install_local(&file_name, report);
    let snapshot = session
        .current()
        .cloned()
        .ok_or_else(|| AppError::Internal("Session is empty after upload".to_string()))?;

    Ok(Json(UploadResponse {
        notice,
        session: snapshot,
    }))
}

async fn upload_remote(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, Rejection> {
    let remote = state.remote.as_ref().ok_or(AppError::RemoteUnavailable)?;
    if remote.is_busy() {
        return Err(AppError::Busy.into());
    }
    let upload = read_upload(multipart).await?;

    // Gate the type locally so a rejected file never leaves the process.
    if let Err(error) = tabular::check_accepted(&upload.file_name, &state.config.accepted_extensions) {
        let notice = Notice::for_local_error(&upload.file_name, &error);
        return Err(Rejection { error, notice });
    }

    let report = remote.analyze(&upload.file_name, upload.data).await?;

    let mut session = state.session.lock();
    let notice = session.apply_remote_report(&upload.file_name, report);
    let snapshot = session
        .current()
        .cloned()
        .ok_or_else(|| AppError::Internal("Session is empty after upload".to_string()))?;

    Ok(Json(UploadResponse {
        notice,
        session: snapshot,
    }))
}
