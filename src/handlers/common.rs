// handlers/common.rs - lookups shared by several handler tiers

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::database::models::donation::total_amount;
use crate::database::models::{
    Adoption, AdoptionRequest, Animal, AnimalSummary, AnimalWithPhotos, Donation, Photo, RequestStatus, User,
    UserStats,
};
use crate::error::ApiError;
use crate::filter::{OrderBy, PredicateBuilder};
use crate::state::AppState;

pub async fn find_animal(state: &AppState, id: i64) -> Result<Animal, ApiError> {
    state
        .repo::<Animal>()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Animal no encontrado"))
}

pub async fn find_user(state: &AppState, id: i64) -> Result<User, ApiError> {
    state
        .repo::<User>()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Usuario no encontrado"))
}

/// The animal plus its photos ordered by `orden`.
pub async fn with_photos(state: &AppState, animal: Animal) -> Result<AnimalWithPhotos, ApiError> {
    let fotos = state
        .repo::<Photo>()
        .select_any(
            PredicateBuilder::new().eq("id_animal", animal.id).build(),
            &[OrderBy::asc("orden"), OrderBy::asc("id_foto")],
        )
        .await?;
    Ok(AnimalWithPhotos { animal, fotos })
}

/// Attach photo and request counts to each animal, keeping the input order.
pub async fn summarize(state: &AppState, animals: Vec<Animal>) -> Result<Vec<AnimalSummary>, ApiError> {
    if animals.is_empty() {
        return Ok(vec![]);
    }
    let ids: Vec<i64> = animals.iter().map(|a| a.id).collect();

    let photos = state
        .repo::<Photo>()
        .select_any(PredicateBuilder::new().is_in("id_animal", ids.clone()).build(), &[])
        .await?;
    let requests = state
        .repo::<AdoptionRequest>()
        .select_any(PredicateBuilder::new().is_in("id_animal", ids).build(), &[])
        .await?;

    let mut photo_counts: HashMap<i64, usize> = HashMap::new();
    for photo in &photos {
        *photo_counts.entry(photo.animal_id).or_default() += 1;
    }
    let mut request_counts: HashMap<i64, usize> = HashMap::new();
    for request in &requests {
        *request_counts.entry(request.animal_id).or_default() += 1;
    }

    Ok(animals
        .into_iter()
        .map(|animal| AnimalSummary {
            total_fotos: photo_counts.get(&animal.id).copied().unwrap_or(0),
            total_solicitudes: request_counts.get(&animal.id).copied().unwrap_or(0),
            animal,
        })
        .collect())
}

pub async fn user_stats(state: &AppState, user_id: i64) -> Result<UserStats, ApiError> {
    let requests = state
        .repo::<AdoptionRequest>()
        .select_any(PredicateBuilder::new().eq("id_usuario", user_id).build(), &[])
        .await?;
    let total_adopciones = state
        .repo::<Adoption>()
        .count(PredicateBuilder::new().eq("id_usuario", user_id).build())
        .await?;
    let donations = state
        .repo::<Donation>()
        .select_any(PredicateBuilder::new().eq("id_usuario", user_id).build(), &[])
        .await?;

    Ok(UserStats {
        total_solicitudes: requests.len(),
        solicitudes_aprobadas: requests.iter().filter(|r| r.status == RequestStatus::Approved).count(),
        total_adopciones,
        total_donaciones: donations.len(),
        total_donado: total_amount(&donations),
    })
}

/// Trimmed text from an optional body field; blank reads as absent.
pub fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Animal fields shown next to requests and adoptions.
#[derive(Debug, Clone, Serialize)]
pub struct AnimalBrief {
    pub id_animal: i64,
    pub nombre: String,
    pub tipo: String,
    pub foto_principal: Option<String>,
}

/// User fields shown to administrators next to requests, adoptions and donations.
#[derive(Debug, Clone, Serialize)]
pub struct UserBrief {
    pub id_usuario: i64,
    pub nombre_completo: String,
    pub email: String,
}

/// A row together with the animal and user it refers to.
#[derive(Debug, Serialize)]
pub struct Joined<T: Serialize> {
    #[serde(flatten)]
    pub row: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal: Option<AnimalBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UserBrief>,
}

async fn animal_briefs(state: &AppState, ids: BTreeSet<i64>) -> Result<HashMap<i64, AnimalBrief>, ApiError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let animals = state
        .repo::<Animal>()
        .select_any(PredicateBuilder::new().is_in("id_animal", ids).build(), &[])
        .await?;
    Ok(animals
        .into_iter()
        .map(|a| {
            let brief = AnimalBrief {
                id_animal: a.id,
                nombre: a.name,
                tipo: a.species,
                foto_principal: a.main_photo,
            };
            (brief.id_animal, brief)
        })
        .collect())
}

async fn user_briefs(state: &AppState, ids: BTreeSet<i64>) -> Result<HashMap<i64, UserBrief>, ApiError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = state
        .repo::<User>()
        .select_any(PredicateBuilder::new().is_in("id_usuario", ids).build(), &[])
        .await?;
    Ok(users
        .into_iter()
        .map(|u| {
            let brief = UserBrief {
                id_usuario: u.id,
                nombre_completo: u.full_name,
                email: u.email,
            };
            (brief.id_usuario, brief)
        })
        .collect())
}

/// Join each row with its animal and, when `with_user` is set, its user.
/// `keys` yields the (animal id, user id) a row refers to.
pub async fn join_rows<T, F>(state: &AppState, rows: Vec<T>, with_user: bool, keys: F) -> Result<Vec<Joined<T>>, ApiError>
where
    T: Serialize,
    F: Fn(&T) -> (Option<i64>, i64),
{
    let animal_ids = rows.iter().filter_map(|r| keys(r).0).collect();
    let user_ids = if with_user { rows.iter().map(|r| keys(r).1).collect() } else { BTreeSet::new() };

    let animals = animal_briefs(state, animal_ids).await?;
    let users = user_briefs(state, user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let (animal_id, user_id) = keys(&row);
            Joined {
                animal: animal_id.and_then(|id| animals.get(&id).cloned()),
                usuario: users.get(&user_id).cloned(),
                row,
            }
        })
        .collect())
}
