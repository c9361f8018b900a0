// handlers/elevated/animals.rs - catalogue management (admin only)

use axum::extract::State;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::database::models::{Animal, AnimalStatus, AnimalWithPhotos, Photo};
use crate::error::ApiError;
use crate::filter::{PredicateBuilder, SqlParam};
use crate::handlers::common::{find_animal, with_photos};
use crate::middleware::{ApiResponse, ApiResult, IdParam, JsonBody};
use crate::state::AppState;
use crate::uploads::{FormFields, FormPayload, ImageUpload};

/// Exclusive bound of the NUMERIC(6, 2) weight column.
const MAX_WEIGHT: f64 = 10_000.0;

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub estado: Option<String>,
}

/// Column values for an animal row, built from a form over defaults or an existing row.
#[derive(Debug, Clone)]
struct AnimalDraft {
    nombre: Option<String>,
    tipo: Option<String>,
    raza: Option<String>,
    edad_anos: Option<i32>,
    edad_meses: Option<i32>,
    sexo: Option<String>,
    tamanio: Option<String>,
    peso: Option<f64>,
    color: Option<String>,
    descripcion: Option<String>,
    caracteristicas: Option<String>,
    historia: Option<String>,
    estado_salud: Option<String>,
    foto_principal: Option<String>,
    estado: AnimalStatus,
    fecha_ingreso: NaiveDate,
}

impl AnimalDraft {
    fn blank() -> Self {
        Self {
            nombre: None,
            tipo: None,
            raza: None,
            edad_anos: None,
            edad_meses: None,
            sexo: None,
            tamanio: None,
            peso: None,
            color: None,
            descripcion: None,
            caracteristicas: None,
            historia: None,
            estado_salud: None,
            foto_principal: None,
            estado: AnimalStatus::Available,
            fecha_ingreso: Utc::now().date_naive(),
        }
    }

    fn from_animal(a: &Animal) -> Self {
        Self {
            nombre: Some(a.name.clone()),
            tipo: Some(a.species.clone()),
            raza: a.breed.clone(),
            edad_anos: a.age_years,
            edad_meses: a.age_months,
            sexo: Some(a.sex.clone()),
            tamanio: Some(a.size.clone()),
            peso: a.weight,
            color: a.color.clone(),
            descripcion: a.description.clone(),
            caracteristicas: a.traits.clone(),
            historia: a.story.clone(),
            estado_salud: a.health.clone(),
            foto_principal: a.main_photo.clone(),
            estado: a.status,
            fecha_ingreso: a.intake_date,
        }
    }

    /// Fields present in the form replace the draft's; a blank value clears an optional field.
    fn overlay(&mut self, f: &FormFields) -> Result<(), ApiError> {
        let text = |key: &str, slot: &mut Option<String>| {
            if f.has(key) {
                *slot = f.text(key);
            }
        };
        text("nombre", &mut self.nombre);
        text("tipo", &mut self.tipo);
        text("raza", &mut self.raza);
        text("sexo", &mut self.sexo);
        text("tamanio", &mut self.tamanio);
        text("color", &mut self.color);
        text("descripcion", &mut self.descripcion);
        text("caracteristicas", &mut self.caracteristicas);
        text("historia", &mut self.historia);
        text("estado_salud", &mut self.estado_salud);

        if f.has("edad_anos") {
            self.edad_anos = f.non_negative_int("edad_anos")?;
        }
        if f.has("edad_meses") {
            self.edad_meses = f.non_negative_int("edad_meses")?;
        }
        if f.has("peso") {
            let weight = f.float("peso")?.map(|p| (p * 100.0).round() / 100.0);
            if weight.is_some_and(|p| !(0.0..MAX_WEIGHT).contains(&p)) {
                return Err(ApiError::validation("El campo peso debe ser un número entre 0 y 9999.99"));
            }
            self.peso = weight;
        }
        if let Some(estado) = f.text("estado") {
            self.estado = estado.parse().map_err(|_| ApiError::validation("Estado no válido"))?;
        }
        if let Some(fecha) = f.date("fecha_ingreso")? {
            self.fecha_ingreso = fecha;
        }
        Ok(())
    }

    fn into_values(self) -> Result<Vec<(&'static str, SqlParam)>, ApiError> {
        let (Some(nombre), Some(tipo), Some(sexo), Some(tamanio)) = (self.nombre, self.tipo, self.sexo, self.tamanio)
        else {
            return Err(ApiError::validation("Nombre, tipo, sexo y tamaño son obligatorios"));
        };

        Ok(vec![
            ("nombre", nombre.into()),
            ("tipo", tipo.into()),
            ("raza", self.raza.into()),
            ("edad_anos", self.edad_anos.into()),
            ("edad_meses", self.edad_meses.into()),
            ("sexo", sexo.into()),
            ("tamanio", tamanio.into()),
            ("peso", self.peso.into()),
            ("color", self.color.into()),
            ("descripcion", self.descripcion.into()),
            ("caracteristicas", self.caracteristicas.into()),
            ("historia", self.historia.into()),
            ("estado_salud", self.estado_salud.into()),
            ("foto_principal", self.foto_principal.into()),
            ("estado", self.estado.as_str().into()),
            ("fecha_ingreso", self.fecha_ingreso.into()),
        ])
    }
}

/// Save the image if one was sent; returns its public path.
async fn store_image(state: &AppState, image: Option<&ImageUpload>) -> Result<Option<String>, ApiError> {
    match image {
        Some(image) => Ok(Some(state.images.save(image).await?)),
        None => Ok(None),
    }
}

/// Best-effort delete; the row change already happened.
async fn discard_image(state: &AppState, public_path: &str) {
    if let Err(e) = state.images.remove(public_path).await {
        tracing::warn!("Could not delete image {}: {}", public_path, e);
    }
}

/// POST /api/animales - add an animal, optionally with its main picture
pub async fn create(State(state): State<AppState>, form: FormPayload) -> ApiResult<AnimalWithPhotos> {
    let mut draft = AnimalDraft::blank();
    draft.overlay(&form.fields)?;
    // Fail on missing fields before anything touches the disk
    draft.clone().into_values()?;

    let saved = store_image(&state, form.image.as_ref()).await?;
    if saved.is_some() {
        draft.foto_principal = saved.clone();
    }

    let id = match state.repo::<Animal>().insert(draft.into_values()?).await {
        Ok(id) => id,
        Err(e) => {
            if let Some(path) = &saved {
                discard_image(&state, path).await;
            }
            return Err(e.into());
        }
    };
    tracing::info!("Created animal {}", id);

    let animal = with_photos(&state, find_animal(&state, id).await?).await?;
    Ok(ApiResponse::created(animal).message("Animal creado exitosamente"))
}

/// PUT /api/animales/:id - edit an animal; a new picture replaces the old file
pub async fn update(State(state): State<AppState>, IdParam(id): IdParam, form: FormPayload) -> ApiResult<AnimalWithPhotos> {
    let existing = find_animal(&state, id).await?;

    let mut draft = AnimalDraft::from_animal(&existing);
    draft.overlay(&form.fields)?;
    draft.clone().into_values()?;

    let saved = store_image(&state, form.image.as_ref()).await?;
    if saved.is_some() {
        draft.foto_principal = saved.clone();
    }

    let updated = state.repo::<Animal>().update_by_id(id, draft.into_values()?).await;
    match (&updated, &saved) {
        (Ok(true), Some(_)) => {
            if let Some(old) = &existing.main_photo {
                discard_image(&state, old).await;
            }
        }
        (Ok(false) | Err(_), Some(new)) => discard_image(&state, new).await,
        _ => {}
    }
    if !updated? {
        return Err(ApiError::not_found("Animal no encontrado"));
    }

    let animal = with_photos(&state, find_animal(&state, id).await?).await?;
    Ok(ApiResponse::success(animal).message("Animal actualizado exitosamente"))
}

/// DELETE /api/animales/:id - withdraw an animal from the catalogue
pub async fn delete(State(state): State<AppState>, IdParam(id): IdParam) -> ApiResult<()> {
    let animal = find_animal(&state, id).await?;
    state
        .repo::<Animal>()
        .update_by_id(animal.id, vec![("estado", AnimalStatus::Unavailable.as_str().into())])
        .await?;
    tracing::info!("Withdrew animal {}", animal.id);

    Ok(ApiResponse::done("Animal eliminado exitosamente"))
}

/// PATCH /api/animales/:id/status - set the adoption status
pub async fn set_status(State(state): State<AppState>, IdParam(id): IdParam, JsonBody(body): JsonBody<StatusBody>) -> ApiResult<()> {
    let status: AnimalStatus = body
        .estado
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| ApiError::validation("Estado no válido"))?;

    let updated = state
        .repo::<Animal>()
        .update_by_id(id, vec![("estado", status.as_str().into())])
        .await?;
    if !updated {
        return Err(ApiError::not_found("Animal no encontrado"));
    }

    Ok(ApiResponse::done("Estado actualizado exitosamente"))
}

/// POST /api/animales/:id/fotos - add a gallery picture
pub async fn add_photo(State(state): State<AppState>, IdParam(id): IdParam, form: FormPayload) -> ApiResult<Photo> {
    let animal = find_animal(&state, id).await?;
    let image = form
        .image
        .as_ref()
        .ok_or_else(|| ApiError::validation("No se proporcionó ninguna imagen"))?;
    let position = form.fields.non_negative_int("orden")?.unwrap_or(0);
    let description = form.fields.text("descripcion");

    let path = state.images.save(image).await?;
    let photos = state.repo::<Photo>();
    let inserted = photos
        .insert(vec![
            ("id_animal", animal.id.into()),
            ("ruta_foto", path.clone().into()),
            ("descripcion", description.into()),
            ("orden", position.into()),
        ])
        .await;
    let photo_id = match inserted {
        Ok(photo_id) => photo_id,
        Err(e) => {
            discard_image(&state, &path).await;
            return Err(e.into());
        }
    };

    let photo = photos
        .find_by_id(photo_id)
        .await?
        .ok_or_else(|| ApiError::unexpected(format!("photo {} vanished after insert", photo_id)))?;
    Ok(ApiResponse::created(photo).message("Foto agregada exitosamente"))
}

/// DELETE /api/animales/fotos/:id_foto - remove a gallery picture and its file
pub async fn delete_photo(State(state): State<AppState>, IdParam(photo_id): IdParam) -> ApiResult<()> {
    let photos = state.repo::<Photo>();
    let photo = photos
        .select_one(PredicateBuilder::new().eq("id_foto", photo_id).build())
        .await?
        .ok_or_else(|| ApiError::not_found("Foto no encontrada"))?;

    if photos.delete_by_id(photo.id).await? {
        discard_image(&state, &photo.path).await;
    }

    Ok(ApiResponse::done("Foto eliminada exitosamente"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(v: serde_json::Value) -> FormFields {
        FormFields::new(v.as_object().cloned().unwrap())
    }

    #[test]
    fn create_requires_core_fields() {
        let mut draft = AnimalDraft::blank();
        draft.overlay(&form(json!({"nombre": "Luna", "tipo": "perro", "sexo": "hembra"}))).unwrap();
        let err = draft.into_values().unwrap_err();
        assert_eq!(err.message(), "Nombre, tipo, sexo y tamaño son obligatorios");
    }

    #[test]
    fn create_defaults_status_and_intake_date() {
        let mut draft = AnimalDraft::blank();
        draft
            .overlay(&form(json!({"nombre": "Luna", "tipo": "perro", "sexo": "hembra", "tamanio": "mediano", "edad_anos": "2"})))
            .unwrap();
        let values = draft.into_values().unwrap();
        let get = |k: &str| values.iter().find(|(c, _)| *c == k).map(|(_, v)| v.clone()).unwrap();

        assert_eq!(get("estado"), SqlParam::from("disponible"));
        assert_eq!(get("edad_anos"), SqlParam::Int(2));
        assert_eq!(get("raza"), SqlParam::Null);
        assert_eq!(get("fecha_ingreso"), SqlParam::Date(Utc::now().date_naive()));
    }

    #[test]
    fn overlay_keeps_omitted_fields_and_rejects_bad_status() {
        let animal: Animal = serde_json::from_value(json!({
            "id_animal": 1, "nombre": "Rex", "tipo": "perro", "raza": "mestizo", "sexo": "macho",
            "tamanio": "grande", "estado": "reservado", "fecha_ingreso": "2024-01-10"
        }))
        .unwrap();

        let mut draft = AnimalDraft::from_animal(&animal);
        draft.overlay(&form(json!({"nombre": "Rex II", "raza": ""}))).unwrap();
        assert_eq!(draft.nombre.as_deref(), Some("Rex II"));
        assert_eq!(draft.raza, None);
        assert_eq!(draft.tamanio.as_deref(), Some("grande"));
        assert_eq!(draft.estado, AnimalStatus::Reserved);

        let mut draft = AnimalDraft::from_animal(&animal);
        let err = draft.overlay(&form(json!({"estado": "perdido"}))).unwrap_err();
        assert_eq!(err.message(), "Estado no válido");
    }

    #[test]
    fn ages_and_weight_must_fit_their_columns() {
        let mut draft = AnimalDraft::blank();
        let err = draft.overlay(&form(json!({"edad_anos": 3_000_000_000i64}))).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "El campo edad_anos debe ser un número entero no negativo");

        let err = draft.overlay(&form(json!({"edad_meses": "-2"}))).unwrap_err();
        assert_eq!(err.status_code(), 400);

        for peso in [json!(10_000), json!("-1"), json!("NaN")] {
            let err = draft.overlay(&form(json!({ "peso": peso }))).unwrap_err();
            assert_eq!(err.message(), "El campo peso debe ser un número entre 0 y 9999.99");
        }

        draft.overlay(&form(json!({"edad_anos": 4, "peso": "9999,99"}))).unwrap();
        assert_eq!(draft.edad_anos, Some(4));
        assert_eq!(draft.peso, Some(9999.99));
    }
}
