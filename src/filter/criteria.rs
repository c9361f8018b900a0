use serde::Deserialize;

use super::filter::PredicateBuilder;
use super::types::{BuiltFilter, OrderBy};

/// Columns scanned by the free-text `search` criterion.
pub const SEARCH_COLUMNS: [&str; 3] = ["nombre", "raza", "descripcion"];

/// Optional listing criteria, taken straight from the query string.
/// Absent or blank fields impose no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimalCriteria {
    pub tipo: Option<String>,
    pub estado: Option<String>,
    pub sexo: Option<String>,
    pub tamanio: Option<String>,
    pub search: Option<String>,
}

impl AnimalCriteria {
    pub fn build(&self) -> BuiltFilter {
        let mut builder = PredicateBuilder::new()
            .eq_present("tipo", self.tipo.as_deref())
            .eq_present("estado", self.estado.as_deref())
            .eq_present("sexo", self.sexo.as_deref())
            .eq_present("tamanio", self.tamanio.as_deref());

        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            builder = builder.contains_any(&SEARCH_COLUMNS, term);
        }

        builder.build()
    }

    /// Listing order, applied after filtering regardless of criteria.
    pub fn ordering() -> Vec<OrderBy> {
        vec![OrderBy::desc("fecha_ingreso"), OrderBy::desc("id_animal")]
    }
}
