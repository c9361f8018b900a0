// handlers/protected/users.rs - GET /api/usuarios/:id

use axum::extract::State;

use crate::auth::{require_owner_or_role, ResourceDescriptor, Role, SessionClaims};
use crate::handlers::common::{find_user, user_stats};
use crate::handlers::protected::account::ProfileData;
use crate::middleware::{ApiResponse, ApiResult, IdParam};
use crate::state::AppState;

/// GET /api/usuarios/:id - a user's profile, for that user or an admin
pub async fn show(State(state): State<AppState>, claims: SessionClaims, IdParam(id): IdParam) -> ApiResult<ProfileData> {
    require_owner_or_role(&claims, &ResourceDescriptor::owned_by(id), Role::Admin)?;

    let user = find_user(&state, id).await?;
    let stats = user_stats(&state, user.id).await?;

    Ok(ApiResponse::success(ProfileData { user, stats }))
}
