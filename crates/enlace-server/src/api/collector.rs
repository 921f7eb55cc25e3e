// Cron trigger for the payment collector
// Decision: The trigger is an HTTP route gated by a shared secret, so any
// external scheduler (platform cron, curl in CI) can drive it

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

use enlace_core::{CollectionReport, PaymentSummary};

use super::{api_error, internal_error, ApiError};
use crate::services::CollectorService;

/// App state for the collector trigger
#[derive(Clone)]
pub struct CollectorState {
    pub service: Arc<CollectorService>,
    /// Unset secret disables the trigger entirely.
    pub cron_secret: Option<String>,
}

/// Trigger response
#[derive(Debug, Serialize, ToSchema)]
pub struct CollectorRunResponse {
    pub result: CollectionReport,
    pub summary: PaymentSummary,
    pub execution_time_ms: u64,
}

/// Create collector routes. GET supports manual triggering; POST is the
/// usual shape for platform cron.
pub fn routes(state: CollectorState) -> Router {
    Router::new()
        .route("/v1/cron/collector", get(run_collector).post(run_collector))
        .with_state(state)
}

/// Compare the bearer token against the configured secret via SHA-256
/// digests, so the comparison does not short-circuit on the first
/// differing byte.
fn secret_matches(headers: &HeaderMap, expected: &str) -> bool {
    let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return false;
    };
    Sha256::digest(token.trim().as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// GET|POST /v1/cron/collector - Run one collection pass
#[utoipa::path(
    post,
    path = "/v1/cron/collector",
    responses(
        (status = 200, description = "Pass finished", body = CollectorRunResponse),
        (status = 401, description = "Missing or invalid cron secret")
    ),
    tag = "collector"
)]
pub async fn run_collector(
    State(state): State<CollectorState>,
    headers: HeaderMap,
) -> Result<Json<CollectorRunResponse>, ApiError> {
    let Some(secret) = &state.cron_secret else {
        tracing::error!("CRON_SECRET not configured; collector trigger rejected");
        return Err(api_error(StatusCode::UNAUTHORIZED, "Collector disabled"));
    };
    if !secret_matches(&headers, secret) {
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Invalid or missing cron secret",
        ));
    }

    let started = Instant::now();
    let outcome = state
        .service
        .run_pass()
        .await
        .map_err(|e| internal_error("Collection pass", e))?;

    Ok(Json(CollectorRunResponse {
        result: outcome.report,
        summary: outcome.summary,
        execution_time_ms: started.elapsed().as_millis() as u64,
    }))
}
