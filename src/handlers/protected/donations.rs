// handlers/protected/donations.rs - donations made by the caller

use axum::extract::State;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::auth::SessionClaims;
use crate::database::models::Donation;
use crate::error::ApiError;
use crate::filter::{OrderBy, PredicateBuilder, SqlParam};
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;
use crate::uploads::FormFields;

/// Exclusive bound of the NUMERIC(10, 2) amount column.
const MAX_AMOUNT: f64 = 100_000_000.0;

pub fn newest_first() -> [OrderBy; 2] {
    [OrderBy::desc("fecha_donacion"), OrderBy::desc("id_donacion")]
}

/// POST /api/donaciones - record a donation from the caller
///
/// `monto` may arrive as a number or as numeric text; it is kept to cents.
pub async fn create(
    State(state): State<AppState>,
    claims: SessionClaims,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> ApiResult<Donation> {
    let fields = FormFields::new(body);

    // Validated after rounding to cents, which is what gets stored
    let amount = fields
        .float("monto")?
        .map(|m| (m * 100.0).round() / 100.0)
        .filter(|m| *m > 0.0)
        .ok_or_else(|| ApiError::validation("El monto debe ser mayor a 0"))?;
    if amount >= MAX_AMOUNT {
        return Err(ApiError::validation("El monto supera el máximo permitido"));
    }
    let method = fields
        .text("metodo_pago")
        .ok_or_else(|| ApiError::validation("El método de pago es obligatorio"))?;

    let donations = state.repo::<Donation>();
    let id = donations
        .insert(vec![
            ("id_usuario", claims.subject.into()),
            ("monto", amount.into()),
            ("metodo_pago", method.into()),
            ("mensaje", fields.text("mensaje").into()),
            ("fecha_donacion", SqlParam::Timestamp(Utc::now())),
        ])
        .await?;
    let donation = donations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::unexpected(format!("donation {} vanished after insert", id)))?;
    tracing::info!("User {} donated {:.2}", claims.subject, donation.amount);

    Ok(ApiResponse::created(donation).message("Donación registrada exitosamente"))
}

/// GET /api/donaciones/mis-donaciones - the caller's donations, newest first
pub async fn mine(State(state): State<AppState>, claims: SessionClaims) -> ApiResult<Vec<Donation>> {
    let rows = state
        .repo::<Donation>()
        .select_any(PredicateBuilder::new().eq("id_usuario", claims.subject).build(), &newest_first())
        .await?;
    let total = rows.len();

    Ok(ApiResponse::success(rows).total(total))
}
