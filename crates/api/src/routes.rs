//! Admin HTTP endpoints.

use std::future::Future;
use std::sync::Arc;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use refresher_core::BudgetOverrides;
use serde::Deserialize;

use crate::auth::authorize;
use crate::error::{ApiError, Result};
use crate::service::{GenerateRequest, RefreshService, RunAccepted};

#[derive(Clone)]
struct AdminState {
    service: Arc<RefreshService>,
    secret: Arc<str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunBody {
    #[serde(flatten)]
    budgets: BudgetOverrides,
    #[serde(rename = "async")]
    background: bool,
}

/// Build the admin router.
pub fn router(service: Arc<RefreshService>, secret: &str) -> Router {
    let state = AdminState {
        service,
        secret: Arc::from(secret),
    };

    Router::new()
        .route("/health", get(health))
        .route("/admin/refresh/run", post(run))
        .route("/admin/refresh/generate", post(generate))
        .route("/admin/refresh/status", get(status))
        .with_state(state)
}

/// Serve `router` on `bind` until `shutdown` resolves.
pub async fn serve<F>(bind: &str, router: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("admin API listening on http://{local_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

fn parse_body<T: serde::de::DeserializeOwned + Default>(body: &Bytes) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid body: {}", e)))
}

async fn run(
    State(state): State<AdminState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    authorize(&headers, &state.secret)?;
    let body: RunBody = parse_body(&body)?;

    if body.background {
        let run_id = state.service.run_background(&body.budgets);
        let accepted = RunAccepted {
            accepted: true,
            run_id,
        };
        return Ok((StatusCode::ACCEPTED, Json(accepted)).into_response());
    }

    let summary = state.service.run_sync(&body.budgets).await;
    Ok(Json(summary).into_response())
}

async fn generate(
    State(state): State<AdminState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    authorize(&headers, &state.secret)?;
    let request: GenerateRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid body: {}", e)))?;

    let response = state.service.generate(&request).await?;
    Ok(Json(response).into_response())
}

async fn status(State(state): State<AdminState>, headers: HeaderMap) -> Result<Response> {
    authorize(&headers, &state.secret)?;
    Ok(Json(state.service.status().await).into_response())
}
