// handlers/public/animals.rs - catalogue listing, stats and detail

use axum::extract::{Query, State};
use serde::Serialize;

use crate::database::models::animal::rank_similar;
use crate::database::models::{Animal, AnimalStats, AnimalStatus, AnimalSummary, AnimalWithPhotos};
use crate::filter::{AnimalCriteria, PredicateBuilder};
use crate::handlers::common::{find_animal, summarize, with_photos};
use crate::middleware::{ApiResponse, ApiResult, IdParam};
use crate::state::AppState;

const SIMILAR_LIMIT: usize = 4;

#[derive(Debug, Serialize)]
pub struct AnimalDetail {
    pub animal: AnimalWithPhotos,
    pub similares: Vec<Animal>,
}

/// GET /api/animales - filtered listing, newest intake first
pub async fn list(State(state): State<AppState>, Query(criteria): Query<AnimalCriteria>) -> ApiResult<Vec<AnimalSummary>> {
    let animals = state
        .repo::<Animal>()
        .select_any(criteria.build(), &AnimalCriteria::ordering())
        .await?;
    let rows = summarize(&state, animals).await?;
    let total = rows.len();

    Ok(ApiResponse::success(rows).total(total))
}

/// GET /api/animales/stats - catalogue counters
pub async fn stats(State(state): State<AppState>) -> ApiResult<AnimalStats> {
    let animals = state
        .repo::<Animal>()
        .select_any(PredicateBuilder::new().ne("estado", AnimalStatus::Unavailable.as_str()).build(), &[])
        .await?;

    Ok(ApiResponse::success(AnimalStats::tally(&animals)))
}

/// GET /api/animales/:id - one animal with photos and similar animals
pub async fn show(State(state): State<AppState>, IdParam(id): IdParam) -> ApiResult<AnimalDetail> {
    let animal = find_animal(&state, id).await?;

    let candidates = state
        .repo::<Animal>()
        .select_any(
            PredicateBuilder::new()
                .eq("tipo", &animal.species)
                .eq("estado", AnimalStatus::Available.as_str())
                .ne("id_animal", animal.id)
                .build(),
            &[],
        )
        .await?;
    let similares = rank_similar(&animal, candidates, SIMILAR_LIMIT);

    Ok(ApiResponse::success(AnimalDetail {
        animal: with_photos(&state, animal).await?,
        similares,
    }))
}
