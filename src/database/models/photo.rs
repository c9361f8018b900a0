use serde::{Deserialize, Serialize};

use crate::database::repository::Model;
use crate::database::store::Table;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    #[serde(rename = "id_foto")]
    pub id: i64,
    #[serde(rename = "id_animal")]
    pub animal_id: i64,
    #[serde(rename = "ruta_foto")]
    pub path: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "orden", default)]
    pub position: i32,
}

impl Model for Photo {
    const TABLE: Table = Table::Photos;
}
