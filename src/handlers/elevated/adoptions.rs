// handlers/elevated/adoptions.rs - formalizing adoptions

use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;

use crate::database::models::{Adoption, Animal, AnimalStatus, RequestStatus};
use crate::error::ApiError;
use crate::filter::{BuiltFilter, PredicateBuilder};
use crate::handlers::common::{join_rows, present, Joined};
use crate::handlers::protected::adoptions::{adoption_keys, newest_first};
use crate::handlers::protected::requests::find_request;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdoptionBody {
    pub id_solicitud: Option<i64>,
    pub observaciones: Option<String>,
}

/// POST /api/adopciones - turn an approved request into an adoption
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody<AdoptionBody>) -> ApiResult<Adoption> {
    let request_id = body
        .id_solicitud
        .ok_or_else(|| ApiError::validation("La solicitud es obligatoria"))?;
    let request = find_request(&state, request_id).await?;
    if request.status != RequestStatus::Approved {
        return Err(ApiError::validation("Solo se pueden formalizar solicitudes aprobadas"));
    }

    let adoptions = state.repo::<Adoption>();
    if adoptions
        .count(PredicateBuilder::new().eq("id_solicitud", request.id).build())
        .await?
        > 0
    {
        return Err(ApiError::validation("Esta solicitud ya tiene una adopción registrada"));
    }

    let id = adoptions
        .insert(vec![
            ("id_solicitud", request.id.into()),
            ("id_usuario", request.user_id.into()),
            ("id_animal", request.animal_id.into()),
            ("fecha_adopcion", Utc::now().date_naive().into()),
            ("observaciones", present(body.observaciones).into()),
        ])
        .await?;
    state
        .repo::<Animal>()
        .update_by_id(request.animal_id, vec![("estado", AnimalStatus::Adopted.as_str().into())])
        .await?;
    tracing::info!("Animal {} adopted by user {}", request.animal_id, request.user_id);

    let adoption = adoptions
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::unexpected(format!("adoption {} vanished after insert", id)))?;
    Ok(ApiResponse::created(adoption).message("Adopción registrada exitosamente"))
}

/// GET /api/adopciones - every adoption with its animal and adopter
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Joined<Adoption>>> {
    let rows = state.repo::<Adoption>().select_any(BuiltFilter::all(), &newest_first()).await?;
    let rows = join_rows(&state, rows, true, adoption_keys).await?;
    let total = rows.len();

    Ok(ApiResponse::success(rows).total(total))
}
