/// Health check endpoints for liveness and readiness checks
///
/// - Liveness: the process answers requests at all.
/// - Readiness: the record database accepts queries.

use crate::{
    context::AppContext,
    db,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, response::Json, routing::get, Router};

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_basic))
        .route("/health/ready", get(readiness_check))
}

/// Basic health check
pub async fn health_basic() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check
///
/// Returns 503 when the record database cannot be queried.
pub async fn readiness_check(State(ctx): State<AppContext>) -> ApiResult<Json<serde_json::Value>> {
    if let Err(e) = db::test_connection(ctx.results.pool()).await {
        tracing::warn!(error = %e, "readiness_check_failed: database check failed");
        return Err(ApiError::Unavailable("record database unreachable".to_string()));
    }

    Ok(Json(serde_json::json!({
        "status": "ready",
        "version": env!("CARGO_PKG_VERSION")
    })))
}
