// handlers/public/contact.rs - POST /api/contacto

use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;

use crate::database::models::ContactMessage;
use crate::error::ApiError;
use crate::filter::SqlParam;
use crate::handlers::common::present;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactBody {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub asunto: Option<String>,
    pub mensaje: Option<String>,
}

/// POST /api/contacto - store a message from the contact form
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody<ContactBody>) -> ApiResult<ContactMessage> {
    let (Some(name), Some(email), Some(text)) = (present(body.nombre), present(body.email), present(body.mensaje)) else {
        return Err(ApiError::validation("Nombre, email y mensaje son obligatorios"));
    };
    if !email.contains('@') {
        return Err(ApiError::validation("El email no es válido"));
    }

    let messages = state.repo::<ContactMessage>();
    let id = messages
        .insert(vec![
            ("nombre", name.into()),
            ("email", email.into()),
            ("telefono", present(body.telefono).into()),
            ("asunto", present(body.asunto).into()),
            ("mensaje", text.into()),
            ("leido", false.into()),
            ("fecha_envio", SqlParam::Timestamp(Utc::now())),
        ])
        .await?;
    let message = messages
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::unexpected(format!("contact message {} vanished after insert", id)))?;

    Ok(ApiResponse::created(message).message("Mensaje enviado exitosamente"))
}
