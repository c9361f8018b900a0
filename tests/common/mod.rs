#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use voz_animal_api::auth::Role;
use voz_animal_api::config::AppConfig;
use voz_animal_api::database::{MemoryStore, Record, Table};
use voz_animal_api::{app, AppState};

pub const ADMIN_ID: i64 = 1;
pub const USER_ID: i64 = 2;
pub const OTHER_USER_ID: i64 = 3;

/// The full router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        let upload_dir = std::env::temp_dir().join(format!("voz-animal-test-{}", uuid::Uuid::new_v4().simple()));

        let mut config = AppConfig::development();
        config.security.jwt_secret = "integration-test-secret".to_string();
        config.uploads.dir = upload_dir.clone();

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone());
        Self {
            router: app(state.clone()),
            state,
            store,
            upload_dir,
        }
    }

    /// Same as [`TestApp::new`] with an admin and two regular accounts.
    pub async fn with_accounts() -> Self {
        let app = Self::new();
        app.insert_user(ADMIN_ID, "admin@vozanimal.com", Role::Admin).await;
        app.insert_user(USER_ID, "juan@gmail.com", Role::User).await;
        app.insert_user(OTHER_USER_ID, "ana@gmail.com", Role::User).await;
        app
    }

    pub fn token(&self, id: i64, email: &str, role: Role) -> String {
        match self.state.tokens.issue(id, email, role) {
            Ok(issued) => issued.token,
            Err(e) => panic!("could not issue test token: {}", e),
        }
    }

    pub fn admin_token(&self) -> String {
        self.token(ADMIN_ID, "admin@vozanimal.com", Role::Admin)
    }

    pub fn user_token(&self) -> String {
        self.token(USER_ID, "juan@gmail.com", Role::User)
    }

    pub fn other_user_token(&self) -> String {
        self.token(OTHER_USER_ID, "ana@gmail.com", Role::User)
    }

    /// A correctly signed token whose lifetime ended a day ago.
    pub fn expired_token(&self, id: i64, email: &str, role: Role) -> String {
        let expiry = self.state.config.security.jwt_expiry();
        let signed_at = Utc::now() - expiry - Duration::days(1);
        match self.state.tokens.issue_at(id, email, role, signed_at) {
            Ok(issued) => issued.token,
            Err(e) => panic!("could not issue test token: {}", e),
        }
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn insert(&self, table: Table, value: Value) -> i64 {
        let record: Record = match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {}", other),
        };
        self.store.insert_record(table, record).await
    }

    pub async fn insert_user(&self, id: i64, email: &str, role: Role) -> i64 {
        self.insert(
            Table::Users,
            json!({
                "id_usuario": id,
                "nombre_completo": format!("Usuario {}", id),
                "email": email,
                "password": "",
                "telefono": null,
                "direccion": null,
                "rol": role.as_str(),
                "fecha_registro": "2024-01-01T00:00:00+00:00",
                "estado": "activo"
            }),
        )
        .await
    }

    pub async fn insert_animal(&self, id: i64, nombre: &str, tipo: &str, fecha_ingreso: &str, estado: &str) -> i64 {
        self.insert(
            Table::Animals,
            json!({
                "id_animal": id,
                "nombre": nombre,
                "tipo": tipo,
                "raza": null,
                "edad_anos": 2,
                "edad_meses": 0,
                "sexo": "hembra",
                "tamanio": "mediano",
                "peso": null,
                "color": null,
                "descripcion": null,
                "caracteristicas": null,
                "historia": null,
                "estado_salud": null,
                "foto_principal": null,
                "estado": estado,
                "fecha_ingreso": fecha_ingreso
            }),
        )
        .await
    }

    pub async fn insert_request(&self, id: i64, user_id: i64, animal_id: i64, estado: &str) -> i64 {
        self.insert(
            Table::AdoptionRequests,
            json!({
                "id_solicitud": id,
                "id_usuario": user_id,
                "id_animal": animal_id,
                "motivo": "Tengo espacio y tiempo",
                "experiencia_previa": null,
                "tipo_vivienda": "casa",
                "tiene_patio": true,
                "otros_animales": null,
                "estado": estado,
                "observaciones_admin": null,
                "fecha_solicitud": timestamp(Utc::now()),
                "fecha_respuesta": null
            }),
        )
        .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

/// The `message` field of an envelope.
pub fn message(body: &Value) -> &str {
    body["message"].as_str().unwrap_or_default()
}
