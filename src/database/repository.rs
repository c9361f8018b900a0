use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::database::manager::DatabaseError;
use crate::database::store::{Mutation, Record, RecordStore, Table};
use crate::filter::{BuiltFilter, OrderBy, PredicateBuilder, SqlParam};

/// A row type stored in one table.
pub trait Model: DeserializeOwned + Send + Sync {
    const TABLE: Table;
}

/// Typed access to one table through the record store.
pub struct Repository<T> {
    store: Arc<dyn RecordStore>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Model> Repository<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_any(&self, filter: BuiltFilter, order: &[OrderBy]) -> Result<Vec<T>, DatabaseError> {
        let rows = self
            .store
            .find(T::TABLE, &filter.predicate, &filter.params, order)
            .await?;
        rows.into_iter().map(decode::<T>).collect()
    }

    pub async fn select_one(&self, filter: BuiltFilter) -> Result<Option<T>, DatabaseError> {
        Ok(self.select_any(filter, &[]).await?.into_iter().next())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        self.select_one(PredicateBuilder::new().eq(T::TABLE.primary_key(), id).build())
            .await
    }

    pub async fn count(&self, filter: BuiltFilter) -> Result<usize, DatabaseError> {
        Ok(self
            .store
            .find(T::TABLE, &filter.predicate, &filter.params, &[])
            .await?
            .len())
    }

    pub async fn insert(&self, values: Vec<(&'static str, SqlParam)>) -> Result<i64, DatabaseError> {
        let m = Mutation::insert(T::TABLE, values);
        self.store
            .execute(&m.statement, &m.params)
            .await?
            .inserted_id
            .ok_or_else(|| DatabaseError::QueryError(format!("insert into {} returned no id", T::TABLE.name())))
    }

    pub async fn update_by_id(&self, id: i64, values: Vec<(&'static str, SqlParam)>) -> Result<bool, DatabaseError> {
        let m = Mutation::update_by_id(T::TABLE, id, values);
        Ok(self.store.execute(&m.statement, &m.params).await?.affected_rows > 0)
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        let m = Mutation::delete_by_id(T::TABLE, id);
        Ok(self.store.execute(&m.statement, &m.params).await?.affected_rows > 0)
    }
}

fn decode<T: Model>(record: Record) -> Result<T, DatabaseError> {
    serde_json::from_value(Value::Object(record)).map_err(|source| DatabaseError::Decode {
        table: T::TABLE.name(),
        source,
    })
}
