// handlers/elevated/contact.rs - contact inbox

use axum::extract::State;

use crate::database::models::ContactMessage;
use crate::error::ApiError;
use crate::filter::{BuiltFilter, OrderBy};
use crate::middleware::{ApiResponse, ApiResult, IdParam};
use crate::state::AppState;

/// GET /api/contacto - every message, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ContactMessage>> {
    let rows = state
        .repo::<ContactMessage>()
        .select_any(BuiltFilter::all(), &[OrderBy::desc("fecha_envio"), OrderBy::desc("id_mensaje")])
        .await?;
    let total = rows.len();

    Ok(ApiResponse::success(rows).total(total))
}

/// PATCH /api/contacto/:id/leido
pub async fn mark_read(State(state): State<AppState>, IdParam(id): IdParam) -> ApiResult<()> {
    if !state.repo::<ContactMessage>().update_by_id(id, vec![("leido", true.into())]).await? {
        return Err(ApiError::not_found("Mensaje no encontrado"));
    }

    Ok(ApiResponse::done("Mensaje marcado como leído"))
}
