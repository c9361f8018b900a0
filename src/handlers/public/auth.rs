// handlers/public/auth.rs - POST /api/auth/register, POST /api/auth/login

use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::password::{self, PasswordError};
use crate::auth::Role;
use crate::database::models::{AccountStatus, User};
use crate::error::ApiError;
use crate::filter::{PredicateBuilder, SqlParam};
use crate::handlers::common::{find_user, present};
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub nombre_completo: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Identity returned next to a freshly issued token
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    pub rol: Role,
}

#[derive(Debug, Serialize)]
pub struct SessionData {
    pub token: String,
    pub expires_in: i64,
    pub user: SessionUser,
}

fn session_for(state: &AppState, user: User, with_phone: bool) -> Result<SessionData, ApiError> {
    let issued = state.tokens.issue(user.id, &user.email, user.role)?;
    Ok(SessionData {
        token: issued.token,
        expires_in: issued.expires_in,
        user: SessionUser {
            id: user.id,
            nombre: user.full_name,
            email: user.email,
            telefono: if with_phone { user.phone } else { None },
            rol: user.role,
        },
    })
}

/// POST /api/auth/register - create a regular account and sign it in
pub async fn register(State(state): State<AppState>, JsonBody(body): JsonBody<RegisterBody>) -> ApiResult<SessionData> {
    let (Some(full_name), Some(email), Some(plain)) =
        (present(body.nombre_completo), present(body.email), body.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::validation("Nombre completo, email y contraseña son obligatorios"));
    };

    let users = state.repo::<User>();
    if users.count(PredicateBuilder::new().eq("email", &email).build()).await? > 0 {
        return Err(ApiError::validation("El email ya está registrado"));
    }

    if !password::is_long_enough(&plain) {
        return Err(ApiError::validation("La contraseña debe tener al menos 6 caracteres"));
    }
    let hash = password::hash_blocking(plain).await?;

    let id = users
        .insert(vec![
            ("nombre_completo", full_name.into()),
            ("email", email.into()),
            ("password", hash.into()),
            ("telefono", present(body.telefono).into()),
            ("direccion", present(body.direccion).into()),
            ("rol", Role::User.as_str().into()),
            ("fecha_registro", SqlParam::Timestamp(Utc::now())),
            ("estado", AccountStatus::Active.as_str().into()),
        ])
        .await?;

    let user = find_user(&state, id).await?;
    tracing::info!("Registered user {} ({})", user.id, user.email);

    Ok(ApiResponse::created(session_for(&state, user, false)?).message("Usuario registrado exitosamente"))
}

/// POST /api/auth/login - exchange email and password for a token
pub async fn login(State(state): State<AppState>, JsonBody(body): JsonBody<LoginBody>) -> ApiResult<SessionData> {
    let (Some(email), Some(plain)) = (present(body.email), body.password.filter(|p| !p.is_empty())) else {
        return Err(ApiError::validation("Email y contraseña son obligatorios"));
    };

    let user = state
        .repo::<User>()
        .select_one(
            PredicateBuilder::new()
                .eq("email", &email)
                .eq("estado", AccountStatus::Active.as_str())
                .build(),
        )
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Credenciales inválidas"))?;

    let matches = match password::verify_blocking(plain, user.password_hash.clone()).await {
        Ok(matches) => matches,
        Err(PasswordError::MalformedHash(e)) => {
            tracing::warn!("Stored password hash for user {} is unusable: {}", user.id, e);
            false
        }
        Err(e) => return Err(e.into()),
    };
    if !matches {
        return Err(ApiError::unauthenticated("Credenciales inválidas"));
    }

    tracing::info!("User {} signed in", user.id);
    Ok(ApiResponse::success(session_for(&state, user, true)?).message("Inicio de sesión exitoso"))
}
