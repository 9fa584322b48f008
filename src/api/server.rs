//! HTTP server for the consolidation API.
//!
//! The browser UI uploads machine exports and downloads the consolidated
//! spreadsheet; all user-facing banners come from the SSE log stream.
//!
//! # API Endpoints
//!
//! | Method | Path               | Description                              |
//! |--------|--------------------|------------------------------------------|
//! | GET    | `/health`          | Health check                             |
//! | POST   | `/api/consolidate` | Upload CSVs, download consolidated XLSX  |
//! | POST   | `/api/preview`     | Upload CSVs, get a JSON run summary      |
//! | GET    | `/api/logs`        | SSE stream for real-time logs            |

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, RunSummary};
use crate::error::PipelineError;
use crate::export::{ARTIFACT_FILENAME, XLSX_MIME};
use crate::transform::pipeline::{run, FileInput};

/// Start the HTTP server.
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/consolidate", post(consolidate))
        .route("/api/preview", post(preview))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("leakmerge server running on http://localhost:{}", port);
    println!("   POST /api/consolidate - Upload CSVs, download XLSX");
    println!("   POST /api/preview     - Upload CSVs, get run summary");
    println!("   GET  /api/logs        - SSE log stream");
    println!("   GET  /health          - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "leakmerge",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "consolidate": "POST /api/consolidate",
            "preview": "POST /api/preview",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming.
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

type ApiError = (StatusCode, Json<Value>);

/// Pull every uploaded file out of the multipart body, in arrival order.
async fn read_uploads(mut multipart: Multipart) -> Result<Vec<FileInput>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response(&format!("Multipart error: {}", e), &[])),
        )
    })? {
        if field.file_name().is_none() {
            continue;
        }
        let name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("upload-{}", files.len() + 1));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(error_response(&format!("Read error: {}", e), &[])),
                )
            })?
            .to_vec();
        files.push(FileInput::new(name, bytes));
    }

    if files.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(error_response("No files provided", &[])),
        ));
    }

    Ok(files)
}

fn pipeline_error_response(err: PipelineError) -> ApiError {
    match err {
        PipelineError::NoFilesLoaded(failures) => {
            let message = format!("No input file loaded successfully ({} failed)", failures.len());
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(error_response(&message, &failures)),
            )
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&other.to_string(), &[])),
        ),
    }
}

/// Upload machine exports, download the consolidated spreadsheet.
async fn consolidate(multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let files = read_uploads(multipart).await?;
    let report = run(files).map_err(pipeline_error_response)?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", ARTIFACT_FILENAME),
        ),
    ];
    Ok((headers, report.artifact))
}

/// Upload machine exports, get the JSON run summary (no artifact).
async fn preview(multipart: Multipart) -> Result<Json<RunSummary>, ApiError> {
    let files = read_uploads(multipart).await?;
    let report = run(files).map_err(pipeline_error_response)?;

    Ok(Json(RunSummary::from(&report)))
}
