use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Postgres, Row};

use crate::database::manager::DatabaseError;
use crate::database::store::{ExecResult, Record, RecordStore, Statement, Table};
use crate::filter::filter_where::{FilterWhere, Placeholders};
use crate::filter::{OrderBy, Predicate, SqlParam, SqlResult};

/// Record store backed by a Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn find(
        &self,
        table: Table,
        predicate: &Predicate,
        params: &[SqlParam],
        order: &[OrderBy],
    ) -> Result<Vec<Record>, DatabaseError> {
        let sql = FilterWhere::to_select_sql(table.name(), predicate, params, order)?;
        tracing::debug!("find {}: {}", table.name(), sql.query);

        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| match row.try_get::<Value, _>("row")? {
                Value::Object(map) => Ok(map),
                other => Err(DatabaseError::QueryError(format!("expected JSON object row, got {}", other))),
            })
            .collect()
    }

    async fn execute(&self, statement: &Statement, params: &[SqlParam]) -> Result<ExecResult, DatabaseError> {
        let sql = render_statement(statement, params)?;
        tracing::debug!("execute: {}", sql.query);

        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }

        match statement {
            Statement::Insert { .. } => {
                let row = q.fetch_one(&self.pool).await?;
                let id: i64 = row.try_get("id")?;
                Ok(ExecResult { inserted_id: Some(id), affected_rows: 1 })
            }
            Statement::Update { .. } | Statement::Delete { .. } => {
                let done = q.execute(&self.pool).await?;
                Ok(ExecResult { inserted_id: None, affected_rows: done.rows_affected() })
            }
        }
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Render a write statement to SQL text plus the parameters to bind.
pub fn render_statement(statement: &Statement, params: &[SqlParam]) -> Result<SqlResult, DatabaseError> {
    let placeholders = Placeholders::for_params(params);

    let query = match statement {
        Statement::Insert { table, columns } => {
            let names = columns.iter().map(|(c, _)| format!("\"{}\"", c)).collect::<Vec<_>>();
            let values = columns
                .iter()
                .map(|(_, p)| placeholders.render(*p))
                .collect::<Result<Vec<_>, _>>()?;
            format!(
                "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING \"{}\"::bigint AS id",
                table.name(),
                names.join(", "),
                values.join(", "),
                table.primary_key()
            )
        }
        Statement::Update { table, assignments, predicate } => {
            let sets = assignments
                .iter()
                .map(|(c, p)| placeholders.render(*p).map(|v| format!("\"{}\" = {}", c, v)))
                .collect::<Result<Vec<_>, _>>()?;
            let where_clause = FilterWhere::generate(predicate, &placeholders)?;
            format!("UPDATE \"{}\" SET {} WHERE {}", table.name(), sets.join(", "), where_clause)
        }
        Statement::Delete { table, predicate } => {
            let where_clause = FilterWhere::generate(predicate, &placeholders)?;
            format!("DELETE FROM \"{}\" WHERE {}", table.name(), where_clause)
        }
    };

    Ok(SqlResult { query, params: Placeholders::bound(params) })
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        // Rendered as the NULL keyword, never bound
        SqlParam::Null => q,
        SqlParam::Bool(b) => q.bind(*b),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Float(f) => q.bind(*f),
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Date(d) => q.bind(*d),
        SqlParam::Timestamp(t) => q.bind(*t),
    }
}
