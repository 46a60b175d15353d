//! Mapping library errors onto HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http_body_util::LengthLimitError;
use std::error::Error as StdError;

use super::types::ErrorResponse;
use crate::error::{Doc2TextError, ErrorKind};

/// An error ready to be rendered as `{"error": ..., "kind": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    /// A request the server could not make sense of.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                error: message.into(),
                kind: ErrorKind::InvalidReference.to_string(),
            },
        }
    }

    /// The request body ran past the configured size limit.
    pub fn payload_too_large() -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            body: ErrorResponse {
                error: "Request body exceeds the upload size limit".to_string(),
                kind: ErrorKind::ResourceExhausted.to_string(),
            },
        }
    }

    /// An extractor rejection, keeping its status when it blames the client.
    pub fn rejection(status: StatusCode, message: impl Into<String>) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::payload_too_large();
        }
        let mut e = Self::bad_request(message);
        if status.is_client_error() {
            e.status = status;
        }
        e
    }

    /// A multipart body that failed mid-stream.
    ///
    /// A body cut off by the size limit surfaces from axum as a generic
    /// stream failure when no `Content-Length` was sent, so the source chain
    /// is searched for the limit error.
    pub fn multipart(err: MultipartError) -> Self {
        if exceeds_body_limit(&err) {
            return Self::payload_too_large();
        }
        Self::rejection(err.status(), err.body_text())
    }
}

fn exceeds_body_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

impl From<Doc2TextError> for ApiError {
    fn from(err: Doc2TextError) -> Self {
        let kind = err.kind();
        let status = if kind.is_client_error() {
            tracing::debug!("Rejected request ({kind}): {err}");
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Extraction failed ({kind}): {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            body: ErrorResponse {
                error: err.to_string(),
                kind: kind.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
