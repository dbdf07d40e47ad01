use std::sync::Arc;
use axum::{routing::post, Router, Json};
use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use tower_http::cors::{CorsLayer, Any};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use crate::command::Command;
use crate::error::FileArrayError;
use crate::interface::StoreRegistry;

#[derive(Serialize)]
pub struct CommandResponse {
    pub status: String,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn status_of(error: &FileArrayError) -> StatusCode {
    match error {
        FileArrayError::NotFound { .. } | FileArrayError::FileNotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Routes `POST /v1/:name`, running the JSON command in the body against the
/// store named in the path. Requests must carry `Authorization: Basic <token>`.
pub fn router(registry: Arc<StoreRegistry>, token: String) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::POST])
        .allow_headers(Any);
    let expected = format!("Basic {}", token);
    Router::new()
        .route("/v1/:name", post(move |Path(name): Path<String>, headers: HeaderMap, body: String| {
        let registry = Arc::clone(&registry);
        let expected = expected.clone();
        async move {
            let authorized = headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value == expected);
            if !authorized {
                warn!(store = %name, "failed authentication");
                return Err::<(StatusCode, Json<CommandResponse>), _>((StatusCode::UNAUTHORIZED, "Not authorized"));
            }
            // The store is synchronous, so the command runs on a blocking thread.
            let started = std::time::Instant::now();
            let store = name.clone();
            let result = tokio::task::spawn_blocking(move || {
                let command = Command::parse(&body)?;
                registry.run(&store, command)
            }).await.map_err(|e| {
                warn!(error=%e, "Join error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Join error")
            })?;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            match result {
                Ok(outcome) => {
                    info!(store = %name, ms = elapsed_ms, "command complete");
                    let body = CommandResponse { status: "ok".into(), elapsed_ms, result: Some(outcome.to_json()), error: None };
                    Ok((StatusCode::OK, Json(body)))
                }
                Err(e) => {
                    let status = status_of(&e);
                    let msg = format!("{e}");
                    warn!(store = %name, %msg, code = %status.as_u16(), "command error");
                    let body = CommandResponse { status: "error".into(), elapsed_ms, result: None, error: Some(msg) };
                    Ok((status, Json(body)))
                }
            }
        }
    }))
    .layer(cors)
}
