//! HTTP surface tests: drive the router in-process with `oneshot` and serve
//! remote documents from a throwaway local axum server.

#![cfg(feature = "api")]

mod common;

use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use common::{leftovers, pdf_with_pages};
use edgequake_doc2text::api::{create_router, create_router_with_limits, ApiSizeLimits};
use edgequake_doc2text::strategy::pdfium;
use edgequake_doc2text::{DocumentExtractor, ExtractionConfig};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "doc2text-test-boundary";

enum Part<'a> {
    File {
        filename: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { filename, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn app(scratch: &Path) -> Router {
    let config = ExtractionConfig::builder()
        .scratch_dir(scratch)
        .download_timeout_secs(5)
        .build()
        .unwrap();
    app_with(config)
}

fn app_with(config: ExtractionConfig) -> Router {
    create_router(Arc::new(DocumentExtractor::new(config).unwrap()))
}

fn small_limit_app(scratch: &Path) -> Router {
    let config = ExtractionConfig::builder()
        .scratch_dir(scratch)
        .build()
        .unwrap();
    create_router_with_limits(
        Arc::new(DocumentExtractor::new(config).unwrap()),
        ApiSizeLimits::new(1024),
    )
}

async fn post_multipart(app: Router, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart(parts)))
        .unwrap();
    send(app, request).await
}

async fn post_json(app: Router, json: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Local stand-in for a remote document host.
async fn file_server() -> SocketAddr {
    let routes = Router::new()
        .route("/missing.pdf", get(|| async { StatusCode::NOT_FOUND }))
        .route("/garbage.pdf", get(|| async { "this is not a pdf" }))
        .route("/hop", get(|| async { Redirect::temporary("/garbage.pdf") }))
        .route(
            "/download",
            get(|| async {
                (
                    [(CONTENT_DISPOSITION, "attachment; filename=\"setup.exe\"")],
                    "MZ",
                )
            }),
        )
        .route(
            "/hello.pdf",
            get(|| async { pdf_with_pages(&["hello world"]) }),
        )
        .route("/loop.pdf", get(|| async { Redirect::temporary("/loop.pdf") }))
        .route(
            "/slow.pdf",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "too late"
            }),
        )
        .route("/big.pdf", get(|| async { vec![b'x'; 4096] }))
        .route(
            "/big-chunked.pdf",
            get(|| async {
                let chunks = (0..8).map(|_| Ok::<_, std::io::Error>(Bytes::from(vec![b'x'; 512])));
                Body::from_stream(futures::stream::iter(chunks))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes).await.unwrap();
    });
    addr
}

// ── Input validation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_version() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(dir.path()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn empty_form_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post_multipart(app(dir.path()), &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(body["kind"], "invalid_reference");
}

#[tokio::test]
async fn bodyless_post_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(dir.path()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn blank_file_url_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _) = post_json(app(dir.path()), r#"{"file_url": "   "}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(app(dir.path()), r#"{}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post_json(app(dir.path()), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_http_url_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) =
        post_json(app(dir.path()), r#"{"file_url": "file:///etc/passwd"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_reference");
}

#[tokio::test]
async fn unsupported_extension_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post_multipart(
        app(dir.path()),
        &[Part::File {
            filename: "setup.exe",
            bytes: b"MZ\x90\x00",
        }],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"].as_str().unwrap().contains("Unsupported file type"),
        "got: {body}"
    );
    assert_eq!(body["kind"], "unsupported_format");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn zero_byte_pdf_is_500_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post_multipart(
        app(dir.path()),
        &[Part::File {
            filename: "empty.pdf",
            bytes: b"",
        }],
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "corrupt_document");
    assert!(leftovers(dir.path()).is_empty());

    let message = body["error"].as_str().unwrap();
    assert!(message.contains("'empty.pdf'"), "got: {message}");
    assert!(!message.contains("doc2text-"), "got: {message}");
    assert!(
        !message.contains(&*dir.path().to_string_lossy()),
        "got: {message}"
    );
}

#[tokio::test]
async fn upload_wins_over_url() {
    let dir = tempfile::tempdir().unwrap();
    // The URL is unreachable; a 400 for the .exe proves it was never fetched.
    let (status, body) = post_multipart(
        app(dir.path()),
        &[
            Part::Text {
                name: "file_url",
                value: "http://127.0.0.1:9/never.pdf",
            },
            Part::File {
                filename: "tool.exe",
                bytes: b"MZ",
            },
        ],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "unsupported_format");
}

#[tokio::test]
async fn oversized_body_with_content_length_is_413() {
    let dir = tempfile::tempdir().unwrap();
    let body = multipart(&[Part::File {
        filename: "big.pdf",
        bytes: &vec![b'x'; 4096],
    }]);
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let (status, _) = send(small_limit_app(dir.path()), request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn oversized_streamed_body_is_413() {
    let dir = tempfile::tempdir().unwrap();
    let body = multipart(&[Part::File {
        filename: "big.pdf",
        bytes: &vec![b'x'; 4096],
    }]);
    let chunks: Vec<Result<Bytes, std::io::Error>> = body
        .chunks(256)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap();

    let (status, body) = send(small_limit_app(dir.path()), request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "got: {body}");
    assert_eq!(body["kind"], "resource_exhausted");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn form_encoded_file_url_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("file_url=file%3A%2F%2F%2Fetc%2Fpasswd"))
        .unwrap();

    // Parsed as a file_url, not treated as a missing document.
    let (status, body) = send(app(dir.path()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"].as_str().unwrap().contains("file:///etc/passwd"),
        "got: {body}"
    );
}

#[tokio::test]
async fn form_encoded_remote_url_is_fetched() {
    let dir = tempfile::tempdir().unwrap();
    let addr = file_server().await;
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("file_url=http://{addr}/missing.pdf")))
        .unwrap();

    let (status, body) = send(app(dir.path()), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "source_unavailable");
}

// ── Remote documents ─────────────────────────────────────────────────────────

#[tokio::test]
async fn remote_404_is_500_with_fetch_failure() {
    let dir = tempfile::tempdir().unwrap();
    let addr = file_server().await;
    let url = format!("http://{addr}/missing.pdf");

    let (status, body) = post_multipart(
        app(dir.path()),
        &[Part::Text {
            name: "file_url",
            value: &url,
        }],
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("404"), "got: {body}");
    assert_eq!(body["kind"], "source_unavailable");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn remote_url_via_json() {
    let dir = tempfile::tempdir().unwrap();
    let addr = file_server().await;
    let json = format!(r#"{{"file_url": "http://{addr}/missing.pdf"}}"#);

    let (status, body) = post_json(app(dir.path()), &json).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn remote_garbage_pdf_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let addr = file_server().await;
    let json = format!(r#"{{"file_url": "http://{addr}/hop"}}"#);

    // Redirected to /garbage.pdf; the name comes from the final URL.
    let (status, body) = post_json(app(dir.path()), &json).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "corrupt_document");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn remote_redirect_loop_is_source_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let addr = file_server().await;
    let config = ExtractionConfig::builder()
        .scratch_dir(dir.path())
        .max_redirects(3)
        .build()
        .unwrap();
    let json = format!(r#"{{"file_url": "http://{addr}/loop.pdf"}}"#);

    let (status, body) = post_json(app_with(config), &json).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "source_unavailable", "got: {body}");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn remote_slow_download_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let addr = file_server().await;
    let config = ExtractionConfig::builder()
        .scratch_dir(dir.path())
        .download_timeout_secs(1)
        .build()
        .unwrap();
    let json = format!(r#"{{"file_url": "http://{addr}/slow.pdf"}}"#);

    let (status, body) = post_json(app_with(config), &json).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "source_unavailable", "got: {body}");
    assert!(body["error"].as_str().unwrap().contains("timed out"), "got: {body}");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn remote_download_over_limit_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let addr = file_server().await;

    for path in ["big.pdf", "big-chunked.pdf"] {
        let config = ExtractionConfig::builder()
            .scratch_dir(dir.path())
            .max_download_bytes(1024)
            .build()
            .unwrap();
        let json = format!(r#"{{"file_url": "http://{addr}/{path}"}}"#);

        let (status, body) = post_json(app_with(config), &json).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert_eq!(body["kind"], "source_unavailable", "{path}: {body}");
        assert!(
            body["error"].as_str().unwrap().contains("1024 byte limit"),
            "{path}: {body}"
        );
        assert!(leftovers(dir.path()).is_empty());
    }
}

#[tokio::test]
async fn remote_name_from_content_disposition() {
    let dir = tempfile::tempdir().unwrap();
    let addr = file_server().await;
    let json = format!(r#"{{"file_url": "http://{addr}/download"}}"#);

    let (status, body) = post_json(app(dir.path()), &json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains(".exe"), "got: {body}");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn remote_pdf_round_trip() {
    if !pdfium::is_available(None) {
        println!("SKIP: pdfium not available (set PDFIUM_LIB_PATH)");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let addr = file_server().await;
    let json = format!(r#"{{"file_url": "http://{addr}/hello.pdf"}}"#);

    let (status, body) = post_json(app(dir.path()), &json).await;
    assert_eq!(status, StatusCode::OK, "got: {body}");
    assert!(body["extracted_text"]
        .as_str()
        .unwrap()
        .contains("hello world"));
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn uploaded_pdf_round_trip() {
    if !pdfium::is_available(None) {
        println!("SKIP: pdfium not available (set PDFIUM_LIB_PATH)");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let pdf = pdf_with_pages(&["hello world"]);
    let (status, body) = post_multipart(
        app(dir.path()),
        &[Part::File {
            filename: "Hello.PDF",
            bytes: &pdf,
        }],
    )
    .await;
    assert_eq!(status, StatusCode::OK, "got: {body}");
    assert!(body["extracted_text"]
        .as_str()
        .unwrap()
        .contains("hello world"));
    assert!(leftovers(dir.path()).is_empty());
}
