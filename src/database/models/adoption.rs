use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::database::repository::Model;
use crate::database::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en_revision")]
    InReview,
    #[serde(rename = "aprobada")]
    Approved,
    #[serde(rename = "rechazada")]
    Rejected,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pendiente",
            RequestStatus::InReview => "en_revision",
            RequestStatus::Approved => "aprobada",
            RequestStatus::Rejected => "rechazada",
            RequestStatus::Cancelled => "cancelada",
        }
    }

    /// States an administrator may set when reviewing a request.
    pub fn is_review_outcome(&self) -> bool {
        !matches!(self, RequestStatus::Cancelled)
    }
}

impl FromStr for RequestStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(RequestStatus::Pending),
            "en_revision" => Ok(RequestStatus::InReview),
            "aprobada" => Ok(RequestStatus::Approved),
            "rechazada" => Ok(RequestStatus::Rejected),
            "cancelada" => Ok(RequestStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// A user's request to adopt one animal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionRequest {
    #[serde(rename = "id_solicitud")]
    pub id: i64,
    #[serde(rename = "id_usuario")]
    pub user_id: i64,
    #[serde(rename = "id_animal")]
    pub animal_id: i64,
    #[serde(rename = "motivo")]
    pub reason: String,
    #[serde(rename = "experiencia_previa", default)]
    pub prior_experience: Option<String>,
    #[serde(rename = "tipo_vivienda", default)]
    pub housing: Option<String>,
    #[serde(rename = "tiene_patio", default)]
    pub has_yard: Option<bool>,
    #[serde(rename = "otros_animales", default)]
    pub other_pets: Option<String>,
    #[serde(rename = "estado")]
    pub status: RequestStatus,
    #[serde(rename = "observaciones_admin", default)]
    pub admin_notes: Option<String>,
    #[serde(rename = "fecha_solicitud")]
    pub submitted_at: DateTime<Utc>,
    #[serde(rename = "fecha_respuesta", default)]
    pub answered_at: Option<DateTime<Utc>>,
}

impl Model for AdoptionRequest {
    const TABLE: Table = Table::AdoptionRequests;
}

/// A completed adoption, created from an approved request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adoption {
    #[serde(rename = "id_adopcion")]
    pub id: i64,
    #[serde(rename = "id_solicitud")]
    pub request_id: i64,
    #[serde(rename = "id_usuario")]
    pub user_id: i64,
    #[serde(rename = "id_animal")]
    pub animal_id: i64,
    #[serde(rename = "fecha_adopcion")]
    pub adopted_on: NaiveDate,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
}

impl Model for Adoption {
    const TABLE: Table = Table::Adoptions;
}
