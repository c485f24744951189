use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart},
    http::{Method, StatusCode},
    routing::get,
    Router,
};
use bytes::Bytes;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

pub mod analyze;
pub mod session;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .merge(analyze::routes())
        .merge(session::routes())
        .layer(DefaultBodyLimit::max(state.config.max_file_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// The `file` field of a multipart upload.
#[derive(Debug)]
pub(crate) struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::InvalidInput("No filename provided".to_string()))?;
        let data = field.bytes().await.map_err(multipart_error)?;

        tracing::info!("Received upload {}, size: {}KB", file_name, data.len() / 1024);
        return Ok(Upload { file_name, data });
    }

    Err(AppError::InvalidInput("No file provided in upload".to_string()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart field: {}", err))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn health_check_responds_ok() {
        let (app, _) = test_app(Config::default());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn upload_without_file_field_is_bad_request() {
        let (app, _) = test_app(Config::default());
        let (boundary, body) = multipart_body("attachment", "data.csv", b"a\n1\n");
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyze")
                    .header(
                        "Content-Type",
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Invalid input: No file provided in upload");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let config = Config {
            max_file_size: 64,
            ..Config::default()
        };
        let (app, _) = test_app(config);
        let content = "n\n".to_string() + &"1\n".repeat(200);

        let response = upload(&app, "/analyze", "big.csv", content.as_bytes()).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
