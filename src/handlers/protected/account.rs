// handlers/protected/account.rs - the caller's own profile and password

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::password::{self, PasswordError};
use crate::auth::SessionClaims;
use crate::database::models::{User, UserStats};
use crate::error::ApiError;
use crate::filter::SqlParam;
use crate::handlers::common::{find_user, present, user_stats};
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub user: User,
    pub stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
    pub nombre_completo: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// GET /api/auth/profile - own account with activity counters
pub async fn profile_get(State(state): State<AppState>, claims: SessionClaims) -> ApiResult<ProfileData> {
    let user = find_user(&state, claims.subject).await?;
    let stats = user_stats(&state, user.id).await?;

    Ok(ApiResponse::success(ProfileData { user, stats }))
}

/// PUT /api/auth/profile - update name and contact details
///
/// Omitted fields keep their value; a blank phone or address clears it.
pub async fn profile_put(
    State(state): State<AppState>,
    claims: SessionClaims,
    JsonBody(body): JsonBody<ProfileBody>,
) -> ApiResult<UserData> {
    let mut values: Vec<(&'static str, SqlParam)> = Vec::new();

    if let Some(name) = body.nombre_completo {
        let name = present(Some(name)).ok_or_else(|| ApiError::validation("El nombre completo no puede estar vacío"))?;
        values.push(("nombre_completo", name.into()));
    }
    if let Some(phone) = body.telefono {
        values.push(("telefono", present(Some(phone)).into()));
    }
    if let Some(address) = body.direccion {
        values.push(("direccion", present(Some(address)).into()));
    }

    if !values.is_empty() && !state.repo::<User>().update_by_id(claims.subject, values).await? {
        return Err(ApiError::not_found("No se pudo actualizar el perfil"));
    }
    let user = find_user(&state, claims.subject).await?;

    Ok(ApiResponse::success(UserData { user }).message("Perfil actualizado exitosamente"))
}

/// PUT /api/auth/change-password - replace the password after checking the current one
pub async fn change_password(
    State(state): State<AppState>,
    claims: SessionClaims,
    JsonBody(body): JsonBody<ChangePasswordBody>,
) -> ApiResult<()> {
    let (Some(current), Some(new)) = (
        body.current_password.filter(|p| !p.is_empty()),
        body.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::validation("Contraseña actual y nueva son obligatorias"));
    };
    if !password::is_long_enough(&new) {
        return Err(ApiError::validation("La nueva contraseña debe tener al menos 6 caracteres"));
    }

    let user = find_user(&state, claims.subject).await?;
    let matches = match password::verify_blocking(current, user.password_hash.clone()).await {
        Ok(matches) => matches,
        Err(PasswordError::MalformedHash(_)) => false,
        Err(e) => return Err(e.into()),
    };
    if !matches {
        return Err(ApiError::unauthenticated("La contraseña actual es incorrecta"));
    }

    let hash = password::hash_blocking(new).await?;
    state.repo::<User>().update_by_id(user.id, vec![("password", hash.into())]).await?;
    tracing::info!("User {} changed their password", user.id);

    Ok(ApiResponse::done("Contraseña cambiada exitosamente"))
}
