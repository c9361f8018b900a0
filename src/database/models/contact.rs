use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::repository::Model;
use crate::database::store::Table;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(rename = "id_mensaje")]
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "asunto", default)]
    pub subject: Option<String>,
    #[serde(rename = "mensaje")]
    pub body: String,
    #[serde(rename = "leido", default)]
    pub read: bool,
    #[serde(rename = "fecha_envio")]
    pub sent_at: DateTime<Utc>,
}

impl Model for ContactMessage {
    const TABLE: Table = Table::ContactMessages;
}
