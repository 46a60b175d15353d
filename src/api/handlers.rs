//! API request handlers.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use tracing::debug;

use super::error::ApiError;
use super::types::{ApiState, ExtractResponse, HealthResponse, UrlRequest};
use crate::error::Doc2TextError;
use crate::pipeline::source::{InputReference, Upload};

/// Extract endpoint handler.
///
/// POST /extract
///
/// Accepts one of:
/// - `multipart/form-data` with a `file` part and/or a `file_url` text part
/// - `application/json` with `{"file_url": "https://..."}`
/// - `application/x-www-form-urlencoded` with `file_url=https://...`
///
/// An uploaded file wins over `file_url` when both are present. A request
/// with neither, or with any other body type, is rejected with 400. Bodies
/// over the size limit are rejected with 413.
pub async fn extract_handler(
    State(state): State<ApiState>,
    request: Request,
) -> Result<Json<ExtractResponse>, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let input = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::rejection(e.status(), e.body_text()))?;
        read_multipart(multipart).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<UrlRequest>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::rejection(e.status(), e.body_text()))?;
        InputReference::from_parts(None, body.file_url)?
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(body) = Form::<UrlRequest>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::rejection(e.status(), e.body_text()))?;
        InputReference::from_parts(None, body.file_url)?
    } else {
        debug!("No multipart, JSON or form body (content-type: {content_type:?})");
        return Err(Doc2TextError::MissingInput.into());
    };

    let output = state.extractor.extract(input).await?;
    Ok(Json(ExtractResponse {
        extracted_text: output.text,
    }))
}

async fn read_multipart(mut multipart: Multipart) -> Result<InputReference, ApiError> {
    let mut upload = None;
    let mut file_url = None;

    while let Some(field) = multipart.next_field().await.map_err(ApiError::multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(str::to_string).unwrap_or_default();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(ApiError::multipart)?;

                // Browsers send an empty, unnamed part for an untouched file input.
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                upload = Some(Upload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "file_url" => {
                file_url = Some(field.text().await.map_err(ApiError::multipart)?);
            }
            other => debug!("Ignoring multipart field '{other}'"),
        }
    }

    Ok(InputReference::from_parts(upload, file_url)?)
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
