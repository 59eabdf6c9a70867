/// Health checks and metrics
use crate::app::AppState;
use crate::error::{ServiceError, ServiceResult};
use actix_web::{web, HttpResponse, Responder};
use prometheus::{Encoder, TextEncoder};

/// GET /health
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "social-service",
    }))
}

/// GET /ready - checks the database when one is attached
pub async fn ready(state: web::Data<AppState>) -> impl Responder {
    if let Some(pool) = &state.pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!(error = %e, "Readiness check failed");
            return HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unavailable",
                "reason": "database",
            }));
        }
    }

    HttpResponse::Ok().json(serde_json::json!({ "status": "ready" }))
}

/// GET /metrics - Prometheus text format
pub async fn metrics(state: web::Data<AppState>) -> ServiceResult<HttpResponse> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    encoder
        .encode(&state.registry.gather(), &mut buffer)
        .map_err(|e| ServiceError::Internal(format!("metrics encoding failed: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer))
}
