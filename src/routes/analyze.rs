use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};

use super::read_upload;
use crate::{error::AppError, models::AnalysisReport, services::analysis, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/analyze", post(analyze_file))
}

/// Stateless analysis: the contract a remote instance of this service is
/// called through.
async fn analyze_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let upload = read_upload(multipart).await?;
    let accepted = state.config.accepted_extensions.clone();

    let report = tokio::task::spawn_blocking(move || {
        analysis::analyze_upload(&upload.file_name, upload.data, &accepted)
    })
    .await??;

    Ok(Json(report))
}
