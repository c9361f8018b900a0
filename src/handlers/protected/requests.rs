// handlers/protected/requests.rs - adoption requests made by the caller

use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::{require_owner_or_role, ResourceDescriptor, Role, SessionClaims};
use crate::database::models::{AdoptionRequest, AnimalStatus, RequestStatus};
use crate::error::ApiError;
use crate::filter::{OrderBy, PredicateBuilder, SqlParam};
use crate::handlers::common::{find_animal, join_rows, present, Joined};
use crate::middleware::{ApiResponse, ApiResult, IdParam, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RequestBody {
    pub id_animal: Option<i64>,
    pub motivo: Option<String>,
    pub experiencia_previa: Option<String>,
    pub tipo_vivienda: Option<String>,
    pub tiene_patio: Option<bool>,
    pub otros_animales: Option<String>,
}

pub async fn find_request(state: &AppState, id: i64) -> Result<AdoptionRequest, ApiError> {
    state
        .repo::<AdoptionRequest>()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Solicitud no encontrada"))
}

pub fn request_keys(r: &AdoptionRequest) -> (Option<i64>, i64) {
    (Some(r.animal_id), r.user_id)
}

pub fn newest_first() -> [OrderBy; 2] {
    [OrderBy::desc("fecha_solicitud"), OrderBy::desc("id_solicitud")]
}

/// POST /api/solicitudes - ask to adopt an available animal
pub async fn create(
    State(state): State<AppState>,
    claims: SessionClaims,
    JsonBody(body): JsonBody<RequestBody>,
) -> ApiResult<AdoptionRequest> {
    let (Some(animal_id), Some(reason)) = (body.id_animal, present(body.motivo)) else {
        return Err(ApiError::validation("El animal y el motivo son obligatorios"));
    };

    let animal = find_animal(&state, animal_id).await?;
    if animal.status != AnimalStatus::Available {
        return Err(ApiError::validation("El animal no está disponible para adopción"));
    }

    let requests = state.repo::<AdoptionRequest>();
    let open = requests
        .count(
            PredicateBuilder::new()
                .eq("id_usuario", claims.subject)
                .eq("id_animal", animal.id)
                .is_in("estado", [RequestStatus::Pending.as_str(), RequestStatus::InReview.as_str()])
                .build(),
        )
        .await?;
    if open > 0 {
        return Err(ApiError::validation("Ya tienes una solicitud activa para este animal"));
    }

    let id = requests
        .insert(vec![
            ("id_usuario", claims.subject.into()),
            ("id_animal", animal.id.into()),
            ("motivo", reason.into()),
            ("experiencia_previa", present(body.experiencia_previa).into()),
            ("tipo_vivienda", present(body.tipo_vivienda).into()),
            ("tiene_patio", body.tiene_patio.into()),
            ("otros_animales", present(body.otros_animales).into()),
            ("estado", RequestStatus::Pending.as_str().into()),
            ("observaciones_admin", SqlParam::Null),
            ("fecha_solicitud", SqlParam::Timestamp(Utc::now())),
            ("fecha_respuesta", SqlParam::Null),
        ])
        .await?;
    tracing::info!("User {} requested to adopt animal {}", claims.subject, animal.id);

    Ok(ApiResponse::created(find_request(&state, id).await?).message("Solicitud creada exitosamente"))
}

/// GET /api/solicitudes/mis-solicitudes - the caller's requests, newest first
pub async fn mine(State(state): State<AppState>, claims: SessionClaims) -> ApiResult<Vec<Joined<AdoptionRequest>>> {
    let rows = state
        .repo::<AdoptionRequest>()
        .select_any(PredicateBuilder::new().eq("id_usuario", claims.subject).build(), &newest_first())
        .await?;
    let rows = join_rows(&state, rows, false, request_keys).await?;
    let total = rows.len();

    Ok(ApiResponse::success(rows).total(total))
}

/// GET /api/solicitudes/:id - one request, for its author or an admin
pub async fn show(
    State(state): State<AppState>,
    claims: SessionClaims,
    IdParam(id): IdParam,
) -> ApiResult<Joined<AdoptionRequest>> {
    let request = find_request(&state, id).await?;
    require_owner_or_role(&claims, &ResourceDescriptor::owned_by(request.user_id), Role::Admin)?;

    let mut rows = join_rows(&state, vec![request], claims.is_admin(), request_keys).await?;
    let row = rows
        .pop()
        .ok_or_else(|| ApiError::unexpected(format!("request {} lost while joining", id)))?;
    Ok(ApiResponse::success(row))
}

/// DELETE /api/solicitudes/:id - withdraw a pending request
pub async fn cancel(State(state): State<AppState>, claims: SessionClaims, IdParam(id): IdParam) -> ApiResult<()> {
    let request = find_request(&state, id).await?;
    require_owner_or_role(&claims, &ResourceDescriptor::owned_by(request.user_id), Role::Admin)?;

    if request.status != RequestStatus::Pending {
        return Err(ApiError::validation("Solo se pueden cancelar solicitudes pendientes"));
    }
    state
        .repo::<AdoptionRequest>()
        .update_by_id(request.id, vec![("estado", RequestStatus::Cancelled.as_str().into())])
        .await?;

    Ok(ApiResponse::done("Solicitud cancelada exitosamente"))
}
