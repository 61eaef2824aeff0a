//! Librarian HTTP Routes
//!
//! - `POST /librarian/{method}` with a JSON request body
//! - `GET /health`
//!
//! Library calls block on the filesystem, so they run on the blocking pool.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::error;

use crate::service::{DispatchError, LibrarianService, Status};
use crate::store::{ErrorKind, Library};

/// Health check routes
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Method routes, one path segment per service method
pub fn librarian_routes<L: Library + 'static>(service: Arc<LibrarianService<L>>) -> Router {
    Router::new()
        .route("/:method", post(call_method::<L>))
        .with_state(service)
}

async fn call_method<L: Library + 'static>(
    State(service): State<Arc<LibrarianService<L>>>,
    Path(method): Path<String>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if !service.has_method(&method) {
        return failure(
            StatusCode::NOT_FOUND,
            ErrorKind::InvalidRequest,
            DispatchError::UnknownMethod(method).to_string(),
        );
    }

    let body = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                return failure(
                    StatusCode::BAD_REQUEST,
                    ErrorKind::InvalidRequest,
                    format!("Invalid JSON body: {}", e),
                )
            }
        }
    };

    let task = tokio::task::spawn_blocking(move || service.dispatch(&method, body)).await;
    match task {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)),
        Ok(Err(e)) => failure(StatusCode::NOT_FOUND, ErrorKind::InvalidRequest, e.to_string()),
        Err(e) => {
            error!(error = %e, "request handler did not complete");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::IoFailure,
                "Request handler did not complete",
            )
        }
    }
}

fn failure(code: StatusCode, kind: ErrorKind, info: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        code,
        Json(json!({ "status": Status::failure(kind, info) })),
    )
}
