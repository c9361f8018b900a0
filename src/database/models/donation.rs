use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::repository::Model;
use crate::database::store::Table;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    #[serde(rename = "id_donacion")]
    pub id: i64,
    #[serde(rename = "id_usuario")]
    pub user_id: i64,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(rename = "metodo_pago")]
    pub payment_method: String,
    #[serde(rename = "mensaje", default)]
    pub message: Option<String>,
    #[serde(rename = "fecha_donacion")]
    pub donated_at: DateTime<Utc>,
}

impl Model for Donation {
    const TABLE: Table = Table::Donations;
}

/// Sum of donated amounts, rounded to cents.
pub fn total_amount<'a>(donations: impl IntoIterator<Item = &'a Donation>) -> f64 {
    let total: f64 = donations.into_iter().map(|d| d.amount).sum();
    (total * 100.0).round() / 100.0
}
