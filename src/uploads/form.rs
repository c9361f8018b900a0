use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use super::{validate_image, ImageUpload, UploadError};
use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the image file.
pub const IMAGE_FIELD: &str = "imagen";

/// Loosely typed form values. Multipart sends every value as text, JSON may
/// send numbers and booleans; accessors accept either.
#[derive(Debug, Clone, Default)]
pub struct FormFields(Map<String, Value>);

impl FormFields {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Trimmed text; blank and null read as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>, UploadError> {
        match self.0.get(key) {
            Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| invalid(key, "un número entero")),
            Some(Value::String(_)) => self
                .text(key)
                .map(|s| s.parse::<i64>().map_err(|_| invalid(key, "un número entero")))
                .transpose(),
            Some(Value::Null) | None => Ok(None),
            Some(_) => Err(invalid(key, "un número entero")),
        }
    }

    /// Whole number in `0..=i32::MAX`, the range of an INTEGER column.
    pub fn non_negative_int(&self, key: &str) -> Result<Option<i32>, UploadError> {
        self.int(key)?
            .map(|v| {
                i32::try_from(v)
                    .ok()
                    .filter(|v| *v >= 0)
                    .ok_or_else(|| invalid(key, "un número entero no negativo"))
            })
            .transpose()
    }

    pub fn float(&self, key: &str) -> Result<Option<f64>, UploadError> {
        match self.0.get(key) {
            Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| invalid(key, "un número")),
            Some(Value::String(_)) => self
                .text(key)
                .map(|s| s.replace(',', ".").parse::<f64>().map_err(|_| invalid(key, "un número")))
                .transpose(),
            Some(Value::Null) | None => Ok(None),
            Some(_) => Err(invalid(key, "un número")),
        }
    }

    /// `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is used.
    pub fn date(&self, key: &str) -> Result<Option<NaiveDate>, UploadError> {
        let Some(text) = self.text(key) else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(&text).map(|t| t.date_naive()))
            .map(Some)
            .map_err(|_| invalid(key, "una fecha (AAAA-MM-DD)"))
    }
}

fn invalid(field: &str, expected: &'static str) -> UploadError {
    UploadError::InvalidField { field: field.to_string(), expected }
}

/// Body of an animal form: multipart with an optional `imagen` file, or plain JSON.
#[derive(Debug, Default)]
pub struct FormPayload {
    pub fields: FormFields,
    pub image: Option<ImageUpload>,
}

#[async_trait]
impl FromRequest<AppState> for FormPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            return match Json::<Value>::from_request(req, state).await {
                Ok(Json(Value::Object(map))) => Ok(FormPayload { fields: FormFields::new(map), image: None }),
                Ok(_) => Err(ApiError::validation("El cuerpo de la petición debe ser un objeto JSON")),
                Err(rejection) => Err(ApiError::validation(rejection.body_text())),
            };
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(read_multipart(multipart, state.images.max_bytes()).await?)
    }
}

async fn read_multipart(mut multipart: Multipart, max_bytes: usize) -> Result<FormPayload, UploadError> {
    let mut payload = FormPayload::default();
    let mut fields = Map::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(String::from);

        match file_name {
            Some(file_name) if name == IMAGE_FIELD && payload.image.is_none() => {
                // Browsers send an empty part when no file was picked
                if file_name.is_empty() {
                    continue;
                }
                let content_type = field.content_type().unwrap_or("").to_string();
                let extension = validate_image(&file_name, &content_type)?;

                let mut data = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| UploadError::Multipart(e.body_text()))?
                {
                    if data.len() + chunk.len() > max_bytes {
                        return Err(UploadError::too_large(max_bytes));
                    }
                    data.extend_from_slice(&chunk);
                }

                payload.image = Some(ImageUpload { file_name, content_type, extension, data });
            }
            Some(_) => {
                tracing::debug!("Ignoring unexpected file field {:?}", name);
            }
            None => {
                let text = field.text().await.map_err(|e| UploadError::Multipart(e.body_text()))?;
                fields.insert(name, Value::String(text));
            }
        }
    }

    payload.fields = FormFields::new(fields);
    Ok(payload)
}
