//! `GET /health`, mounted at the root rather than under `/api/v1`.
//!
//! Unauthenticated. Answers 503 when the database cannot be reached so load
//! balancers can drop the instance.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use modus_db::models::post::QueueDepth;
use modus_db::repositories::PostRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    /// Absent when the database is down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueDepth>,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    pub latency_ms: u64,
}

async fn report(State(state): State<AppState>) -> impl IntoResponse {
    let started = std::time::Instant::now();
    let reachable = modus_db::health_check(&state.pool).await.is_ok();
    let latency_ms = started.elapsed().as_millis() as u64;

    let queue = if reachable {
        match PostRepo::queue_depth(&state.pool).await {
            Ok(depth) => Some(depth),
            Err(e) => {
                tracing::warn!(error = %e, "Queue depth unavailable");
                None
            }
        }
    } else {
        tracing::warn!("Health check could not reach the database");
        None
    };

    let code = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let report = HealthReport {
        status: if reachable { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            reachable,
            latency_ms,
        },
        queue,
    };
    (code, Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(report))
}
