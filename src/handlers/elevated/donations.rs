// handlers/elevated/donations.rs - GET /api/donaciones

use axum::extract::State;
use serde::Serialize;

use crate::database::models::donation::total_amount;
use crate::database::models::Donation;
use crate::filter::BuiltFilter;
use crate::handlers::common::{join_rows, Joined};
use crate::handlers::protected::donations::newest_first;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DonationLedger {
    pub donaciones: Vec<Joined<Donation>>,
    pub total_recaudado: f64,
}

/// GET /api/donaciones - every donation with its donor, plus the amount raised
pub async fn list(State(state): State<AppState>) -> ApiResult<DonationLedger> {
    let rows = state.repo::<Donation>().select_any(BuiltFilter::all(), &newest_first()).await?;
    let total_recaudado = total_amount(&rows);
    let donaciones = join_rows(&state, rows, true, |d: &Donation| (None, d.user_id)).await?;
    let total = donaciones.len();

    Ok(ApiResponse::success(DonationLedger { donaciones, total_recaudado }).total(total))
}
