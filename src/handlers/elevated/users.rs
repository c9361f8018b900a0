// handlers/elevated/users.rs - account administration

use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{AccountStatus, User};
use crate::error::ApiError;
use crate::filter::{BuiltFilter, OrderBy};
use crate::handlers::common::find_user;
use crate::middleware::{ApiResponse, ApiResult, IdParam, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub estado: Option<String>,
}

/// GET /api/usuarios - every account, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state
        .repo::<User>()
        .select_any(BuiltFilter::all(), &[OrderBy::desc("fecha_registro"), OrderBy::desc("id_usuario")])
        .await?;
    let total = users.len();

    Ok(ApiResponse::success(users).total(total))
}

/// PATCH /api/usuarios/:id/status - activate or deactivate an account
pub async fn set_status(State(state): State<AppState>, IdParam(id): IdParam, JsonBody(body): JsonBody<StatusBody>) -> ApiResult<()> {
    let status: AccountStatus = body
        .estado
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| ApiError::validation("Estado no válido"))?;

    if !state.repo::<User>().update_by_id(id, vec![("estado", status.as_str().into())]).await? {
        return Err(ApiError::not_found("Usuario no encontrado"));
    }
    tracing::info!("User {} is now {}", id, status.as_str());

    Ok(ApiResponse::done("Estado del usuario actualizado exitosamente"))
}

/// DELETE /api/usuarios/:id - deactivate an account; rows that reference it stay
pub async fn delete(State(state): State<AppState>, IdParam(id): IdParam) -> ApiResult<()> {
    let user = find_user(&state, id).await?;
    state
        .repo::<User>()
        .update_by_id(user.id, vec![("estado", AccountStatus::Inactive.as_str().into())])
        .await?;
    tracing::info!("Deactivated user {}", user.id);

    Ok(ApiResponse::done("Usuario eliminado exitosamente"))
}
