// handlers/protected/adoptions.rs - GET /api/adopciones/mis-adopciones

use axum::extract::State;

use crate::auth::SessionClaims;
use crate::database::models::Adoption;
use crate::filter::{OrderBy, PredicateBuilder};
use crate::handlers::common::{join_rows, Joined};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub fn adoption_keys(a: &Adoption) -> (Option<i64>, i64) {
    (Some(a.animal_id), a.user_id)
}

pub fn newest_first() -> [OrderBy; 2] {
    [OrderBy::desc("fecha_adopcion"), OrderBy::desc("id_adopcion")]
}

/// GET /api/adopciones/mis-adopciones - the caller's completed adoptions
pub async fn mine(State(state): State<AppState>, claims: SessionClaims) -> ApiResult<Vec<Joined<Adoption>>> {
    let rows = state
        .repo::<Adoption>()
        .select_any(PredicateBuilder::new().eq("id_usuario", claims.subject).build(), &newest_first())
        .await?;
    let rows = join_rows(&state, rows, false, adoption_keys).await?;
    let total = rows.len();

    Ok(ApiResponse::success(rows).total(total))
}
