// handlers/elevated/requests.rs - reviewing adoption requests

use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;

use crate::database::models::{AdoptionRequest, Animal, AnimalStatus, RequestStatus};
use crate::error::ApiError;
use crate::filter::{PredicateBuilder, SqlParam};
use crate::handlers::common::{join_rows, present, Joined};
use crate::handlers::protected::requests::{find_request, newest_first, request_keys};
use crate::middleware::{ApiResponse, ApiResult, IdParam, JsonBody};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RequestQuery {
    pub estado: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub estado: Option<String>,
    pub observaciones_admin: Option<String>,
}

fn review_outcome(raw: Option<&str>) -> Result<RequestStatus, ApiError> {
    raw.and_then(|s| s.trim().parse::<RequestStatus>().ok())
        .filter(RequestStatus::is_review_outcome)
        .ok_or_else(|| ApiError::validation("Estado no válido"))
}

/// GET /api/solicitudes - every request with its animal and author, optionally by `estado`
pub async fn list(State(state): State<AppState>, Query(query): Query<RequestQuery>) -> ApiResult<Vec<Joined<AdoptionRequest>>> {
    let filter = PredicateBuilder::new()
        .eq_present("estado", query.estado.as_deref())
        .build();
    let rows = state.repo::<AdoptionRequest>().select_any(filter, &newest_first()).await?;
    let rows = join_rows(&state, rows, true, request_keys).await?;
    let total = rows.len();

    Ok(ApiResponse::success(rows).total(total))
}

/// PATCH /api/solicitudes/:id/status - record a review decision
///
/// Approving a request reserves its animal.
pub async fn review(State(state): State<AppState>, IdParam(id): IdParam, JsonBody(body): JsonBody<ReviewBody>) -> ApiResult<AdoptionRequest> {
    let status = review_outcome(body.estado.as_deref())?;
    let request = find_request(&state, id).await?;

    state
        .repo::<AdoptionRequest>()
        .update_by_id(
            request.id,
            vec![
                ("estado", status.as_str().into()),
                ("observaciones_admin", present(body.observaciones_admin).into()),
                ("fecha_respuesta", SqlParam::Timestamp(Utc::now())),
            ],
        )
        .await?;

    if status == RequestStatus::Approved {
        state
            .repo::<Animal>()
            .update_by_id(request.animal_id, vec![("estado", AnimalStatus::Reserved.as_str().into())])
            .await?;
    }
    tracing::info!("Request {} reviewed as {}", request.id, status.as_str());

    Ok(ApiResponse::success(find_request(&state, id).await?).message("Estado de la solicitud actualizado exitosamente"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_accepts_only_review_outcomes() {
        assert_eq!(review_outcome(Some("aprobada")).unwrap(), RequestStatus::Approved);
        assert_eq!(review_outcome(Some(" en_revision ")).unwrap(), RequestStatus::InReview);
        assert!(review_outcome(Some("cancelada")).is_err());
        assert!(review_outcome(Some("archivada")).is_err());
        assert!(review_outcome(None).is_err());
    }
}
