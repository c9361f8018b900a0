// handlers/public/meta.rs - service banner, health and unknown routes

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - API banner
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "API Voz Animal - Sistema de Adopciones",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "activo"
    }))
}

/// GET /health - record store reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Base de datos no disponible",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

/// Fallback for every unmatched route
pub async fn not_found() -> ApiError {
    ApiError::not_found("Ruta no encontrada")
}
