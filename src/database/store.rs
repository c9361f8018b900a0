use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;
use crate::filter::{OrderBy, Predicate, PredicateBuilder, SqlParam};

/// One row as returned by a store: column name to JSON value.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Animals,
    Photos,
    Users,
    AdoptionRequests,
    Adoptions,
    Donations,
    ContactMessages,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Animals,
        Table::Photos,
        Table::Users,
        Table::AdoptionRequests,
        Table::Adoptions,
        Table::Donations,
        Table::ContactMessages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Animals => "animales",
            Table::Photos => "fotos_animales",
            Table::Users => "usuarios",
            Table::AdoptionRequests => "solicitudes_adopcion",
            Table::Adoptions => "adopciones",
            Table::Donations => "donaciones",
            Table::ContactMessages => "mensajes_contacto",
        }
    }

    pub fn primary_key(&self) -> &'static str {
        match self {
            Table::Animals => "id_animal",
            Table::Photos => "id_foto",
            Table::Users => "id_usuario",
            Table::AdoptionRequests => "id_solicitud",
            Table::Adoptions => "id_adopcion",
            Table::Donations => "id_donacion",
            Table::ContactMessages => "id_mensaje",
        }
    }
}

/// Write operations. Values are parameter indexes, like predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Insert {
        table: Table,
        columns: Vec<(&'static str, usize)>,
    },
    Update {
        table: Table,
        assignments: Vec<(&'static str, usize)>,
        predicate: Predicate,
    },
    Delete {
        table: Table,
        predicate: Predicate,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub inserted_id: Option<i64>,
    pub affected_rows: u64,
}

/// A statement together with its positional parameters.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub statement: Statement,
    pub params: Vec<SqlParam>,
}

impl Mutation {
    pub fn insert(table: Table, values: Vec<(&'static str, SqlParam)>) -> Self {
        let (columns, params) = index_values(values);
        Self { statement: Statement::Insert { table, columns }, params }
    }

    /// UPDATE whose WHERE parameters are numbered after the SET list.
    pub fn update<F>(table: Table, values: Vec<(&'static str, SqlParam)>, filter: F) -> Self
    where
        F: FnOnce(PredicateBuilder) -> PredicateBuilder,
    {
        let (assignments, params) = index_values(values);
        let built = filter(PredicateBuilder::continuing(params)).build();
        Self {
            statement: Statement::Update { table, assignments, predicate: built.predicate },
            params: built.params,
        }
    }

    pub fn update_by_id(table: Table, id: i64, values: Vec<(&'static str, SqlParam)>) -> Self {
        Self::update(table, values, |w| w.eq(table.primary_key(), id))
    }

    pub fn delete_by_id(table: Table, id: i64) -> Self {
        let built = PredicateBuilder::new().eq(table.primary_key(), id).build();
        Self {
            statement: Statement::Delete { table, predicate: built.predicate },
            params: built.params,
        }
    }
}

fn index_values(values: Vec<(&'static str, SqlParam)>) -> (Vec<(&'static str, usize)>, Vec<SqlParam>) {
    let mut params = Vec::with_capacity(values.len());
    let mut columns = Vec::with_capacity(values.len());
    for (column, value) in values {
        params.push(value);
        columns.push((column, params.len() - 1));
    }
    (columns, params)
}

/// Persistence collaborator used by every handler.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(
        &self,
        table: Table,
        predicate: &Predicate,
        params: &[SqlParam],
        order: &[OrderBy],
    ) -> Result<Vec<Record>, DatabaseError>;

    async fn execute(&self, statement: &Statement, params: &[SqlParam]) -> Result<ExecResult, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
