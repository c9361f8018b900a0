use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::database::models::Photo;
use crate::database::repository::Model;
use crate::database::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimalStatus {
    #[serde(rename = "disponible")]
    Available,
    #[serde(rename = "adoptado")]
    Adopted,
    #[serde(rename = "reservado")]
    Reserved,
    #[serde(rename = "no_disponible")]
    Unavailable,
}

impl AnimalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalStatus::Available => "disponible",
            AnimalStatus::Adopted => "adoptado",
            AnimalStatus::Reserved => "reservado",
            AnimalStatus::Unavailable => "no_disponible",
        }
    }
}

impl FromStr for AnimalStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disponible" => Ok(AnimalStatus::Available),
            "adoptado" => Ok(AnimalStatus::Adopted),
            "reservado" => Ok(AnimalStatus::Reserved),
            "no_disponible" => Ok(AnimalStatus::Unavailable),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    #[serde(rename = "id_animal")]
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub species: String,
    #[serde(rename = "raza", default)]
    pub breed: Option<String>,
    #[serde(rename = "edad_anos", default)]
    pub age_years: Option<i32>,
    #[serde(rename = "edad_meses", default)]
    pub age_months: Option<i32>,
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "tamanio")]
    pub size: String,
    #[serde(rename = "peso", default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "caracteristicas", default)]
    pub traits: Option<String>,
    #[serde(rename = "historia", default)]
    pub story: Option<String>,
    #[serde(rename = "estado_salud", default)]
    pub health: Option<String>,
    #[serde(rename = "foto_principal", default)]
    pub main_photo: Option<String>,
    #[serde(rename = "estado")]
    pub status: AnimalStatus,
    #[serde(rename = "fecha_ingreso")]
    pub intake_date: NaiveDate,
}

impl Model for Animal {
    const TABLE: Table = Table::Animals;
}

/// Listing row: the animal plus related-row counts.
#[derive(Debug, Clone, Serialize)]
pub struct AnimalSummary {
    #[serde(flatten)]
    pub animal: Animal,
    pub total_fotos: usize,
    pub total_solicitudes: usize,
}

/// An animal with its photos in display order.
#[derive(Debug, Clone, Serialize)]
pub struct AnimalWithPhotos {
    #[serde(flatten)]
    pub animal: Animal,
    pub fotos: Vec<Photo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnimalStats {
    pub total: usize,
    pub disponibles: usize,
    pub adoptados: usize,
    pub reservados: usize,
    pub perros: usize,
    pub gatos: usize,
}

impl AnimalStats {
    /// Tally every animal except those withdrawn from the catalogue.
    pub fn tally<'a>(animals: impl IntoIterator<Item = &'a Animal>) -> Self {
        let mut stats = Self::default();
        for animal in animals.into_iter().filter(|a| a.status != AnimalStatus::Unavailable) {
            stats.total += 1;
            match animal.status {
                AnimalStatus::Available => stats.disponibles += 1,
                AnimalStatus::Adopted => stats.adoptados += 1,
                AnimalStatus::Reserved => stats.reservados += 1,
                AnimalStatus::Unavailable => {}
            }
            match animal.species.as_str() {
                "perro" => stats.perros += 1,
                "gato" => stats.gatos += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Up to `limit` available animals of the same species as `target`, closest
/// first: same size before different size, then by age difference.
pub fn rank_similar(target: &Animal, candidates: Vec<Animal>, limit: usize) -> Vec<Animal> {
    let mut similar: Vec<Animal> = candidates
        .into_iter()
        .filter(|a| a.id != target.id && a.species == target.species && a.status == AnimalStatus::Available)
        .collect();

    // Unknown ages sort after every known difference
    similar.sort_by_key(|a| {
        let size_rank = if a.size == target.size { 0 } else { 1 };
        let age_gap = match (a.age_years, target.age_years) {
            (Some(x), Some(y)) => (x - y).unsigned_abs(),
            _ => u32::MAX,
        };
        (size_rank, age_gap)
    });
    similar.truncate(limit);
    similar
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn animal(id: i64, tipo: &str, tamanio: &str, edad: Option<i32>, estado: &str) -> Animal {
        serde_json::from_value(json!({
            "id_animal": id,
            "nombre": format!("animal-{}", id),
            "tipo": tipo,
            "sexo": "macho",
            "tamanio": tamanio,
            "edad_anos": edad,
            "estado": estado,
            "fecha_ingreso": "2024-05-01"
        }))
        .unwrap()
    }

    #[test]
    fn decodes_store_record() {
        let a: Animal = serde_json::from_value(json!({
            "id_animal": 3,
            "nombre": "Luna",
            "tipo": "perro",
            "raza": null,
            "sexo": "hembra",
            "tamanio": "mediano",
            "peso": 12.5,
            "estado": "no_disponible",
            "fecha_ingreso": "2024-01-15"
        }))
        .unwrap();
        assert_eq!(a.status, AnimalStatus::Unavailable);
        assert_eq!(a.weight, Some(12.5));
        assert_eq!(a.intake_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        let out = serde_json::to_value(&a).unwrap();
        assert_eq!(out["nombre"], "Luna");
        assert_eq!(out["fecha_ingreso"], "2024-01-15");
    }

    #[test]
    fn stats_skip_withdrawn_animals() {
        let animals = vec![
            animal(1, "perro", "grande", Some(2), "disponible"),
            animal(2, "gato", "chico", Some(1), "adoptado"),
            animal(3, "perro", "chico", Some(4), "reservado"),
            animal(4, "perro", "chico", Some(4), "no_disponible"),
            animal(5, "conejo", "chico", None, "disponible"),
        ];
        assert_eq!(
            AnimalStats::tally(&animals),
            AnimalStats { total: 4, disponibles: 2, adoptados: 1, reservados: 1, perros: 2, gatos: 1 }
        );
    }

    #[test]
    fn similar_prefers_same_size_then_closest_age() {
        let target = animal(1, "perro", "mediano", Some(3), "disponible");
        let candidates = vec![
            target.clone(),
            animal(2, "perro", "grande", Some(3), "disponible"),
            animal(3, "perro", "mediano", Some(9), "disponible"),
            animal(4, "perro", "mediano", Some(2), "disponible"),
            animal(5, "gato", "mediano", Some(3), "disponible"),
            animal(6, "perro", "mediano", Some(3), "adoptado"),
            animal(7, "perro", "chico", None, "disponible"),
        ];

        let ids: Vec<i64> = rank_similar(&target, candidates, 4).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 7]);
    }

    #[test]
    fn similar_respects_limit() {
        let target = animal(1, "gato", "chico", Some(1), "disponible");
        let candidates = (2..10).map(|id| animal(id, "gato", "chico", Some(1), "disponible")).collect();
        assert_eq!(rank_similar(&target, candidates, 4).len(), 4);
    }
}
