use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::auth::Role;
use crate::database::repository::Model;
use crate::database::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "inactivo")]
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "activo",
            AccountStatus::Inactive => "inactivo",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activo" => Ok(AccountStatus::Active),
            "inactivo" => Ok(AccountStatus::Inactive),
            _ => Err(()),
        }
    }
}

/// A user account. The password hash is read from the store but never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "id_usuario")]
    pub id: i64,
    #[serde(rename = "nombre_completo")]
    pub full_name: String,
    pub email: String,
    #[serde(rename = "password", skip_serializing, default)]
    pub password_hash: String,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(rename = "fecha_registro")]
    pub registered_at: DateTime<Utc>,
    #[serde(rename = "estado")]
    pub status: AccountStatus,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

impl Model for User {
    const TABLE: Table = Table::Users;
}

/// Activity counters shown on a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserStats {
    pub total_solicitudes: usize,
    pub solicitudes_aprobadas: usize,
    pub total_adopciones: usize,
    pub total_donaciones: usize,
    pub total_donado: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_hash_never_serialized() {
        let user: User = serde_json::from_value(json!({
            "id_usuario": 7,
            "nombre_completo": "Juan Pérez",
            "email": "juan@gmail.com",
            "password": "$argon2id$v=19$...",
            "rol": "usuario",
            "fecha_registro": "2024-03-01T10:00:00.000000+00:00",
            "estado": "activo"
        }))
        .unwrap();
        assert_eq!(user.password_hash, "$argon2id$v=19$...");

        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("password").is_none());
        assert_eq!(out["rol"], "usuario");
        assert_eq!(out["id_usuario"], 7);
    }
}
