use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{ExecResult, Record, RecordStore, Statement, Table};
use crate::filter::{FilterError, OrderBy, Predicate, SortDirection, SqlParam};

#[derive(Debug, Default)]
struct TableData {
    rows: Vec<Record>,
    next_id: i64,
}

impl TableData {
    fn insert(&mut self, table: Table, mut record: Record) -> i64 {
        let pk = table.primary_key();
        let id = match record.get(pk).and_then(Value::as_i64) {
            Some(explicit) => explicit,
            None => self.next_id + 1,
        };
        self.next_id = self.next_id.max(id);
        record.insert(pk.to_string(), Value::from(id));
        self.rows.push(record);
        id
    }
}

/// Record store kept in process memory. Evaluates the same predicate trees
/// as the Postgres store, with Postgres semantics for NULL and ordering.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, TableData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw record, keeping its primary key when one is given.
    pub async fn insert_record(&self, table: Table, record: Record) -> i64 {
        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().insert(table, record)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(
        &self,
        table: Table,
        predicate: &Predicate,
        params: &[SqlParam],
        order: &[OrderBy],
    ) -> Result<Vec<Record>, DatabaseError> {
        let tables = self.tables.read().await;
        let Some(data) = tables.get(&table) else {
            return Ok(vec![]);
        };

        let mut out = Vec::new();
        for row in &data.rows {
            if matches(predicate, row, params)? {
                out.push(row.clone());
            }
        }

        out.sort_by(|a, b| {
            order
                .iter()
                .map(|o| {
                    let ord = compare_values(a.get(o.column), b.get(o.column));
                    match o.sort {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        Ok(out)
    }

    async fn execute(&self, statement: &Statement, params: &[SqlParam]) -> Result<ExecResult, DatabaseError> {
        let mut tables = self.tables.write().await;

        match statement {
            Statement::Insert { table, columns } => {
                let mut record = Record::new();
                for (column, p) in columns {
                    record.insert(column.to_string(), param(params, *p)?.to_json());
                }
                let id = tables.entry(*table).or_default().insert(*table, record);
                Ok(ExecResult { inserted_id: Some(id), affected_rows: 1 })
            }
            Statement::Update { table, assignments, predicate } => {
                let Some(data) = tables.get_mut(table) else {
                    return Ok(ExecResult::default());
                };
                let mut affected = 0;
                for row in data.rows.iter_mut() {
                    if matches(predicate, row, params)? {
                        for (column, p) in assignments {
                            row.insert(column.to_string(), param(params, *p)?.to_json());
                        }
                        affected += 1;
                    }
                }
                Ok(ExecResult { inserted_id: None, affected_rows: affected })
            }
            Statement::Delete { table, predicate } => {
                let Some(data) = tables.get_mut(table) else {
                    return Ok(ExecResult::default());
                };
                let mut kept = Vec::with_capacity(data.rows.len());
                let mut affected = 0;
                for row in data.rows.drain(..) {
                    if matches(predicate, &row, params)? {
                        affected += 1;
                    } else {
                        kept.push(row);
                    }
                }
                data.rows = kept;
                Ok(ExecResult { inserted_id: None, affected_rows: affected })
            }
        }
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

fn param(params: &[SqlParam], index: usize) -> Result<&SqlParam, FilterError> {
    params.get(index).ok_or(FilterError::UnboundParameter(index + 1))
}

fn matches(predicate: &Predicate, row: &Record, params: &[SqlParam]) -> Result<bool, FilterError> {
    let field = |column: &str| row.get(column).filter(|v| !v.is_null());

    Ok(match predicate {
        Predicate::All => true,
        Predicate::Eq { column, param: p } => match param(params, *p)? {
            SqlParam::Null => field(column).is_none(),
            value => field(column).is_some_and(|v| json_eq(v, &value.to_json())),
        },
        Predicate::Ne { column, param: p } => match param(params, *p)? {
            SqlParam::Null => field(column).is_some(),
            value => field(column).is_some_and(|v| !json_eq(v, &value.to_json())),
        },
        Predicate::ILike { column, param: p } => {
            let pattern = match param(params, *p)? {
                SqlParam::Text(s) => s.to_lowercase(),
                _ => return Ok(false),
            };
            field(column)
                .and_then(Value::as_str)
                .is_some_and(|text| like_match(&pattern, &text.to_lowercase()))
        }
        Predicate::In { column, params: list } => {
            let Some(v) = field(column) else { return Ok(false) };
            let mut found = false;
            for p in list {
                let value = param(params, *p)?;
                if !value.is_null() && json_eq(v, &value.to_json()) {
                    found = true;
                    break;
                }
            }
            found
        }
        Predicate::And(parts) => {
            for p in parts {
                if !matches(p, row, params)? {
                    return Ok(false);
                }
            }
            true
        }
        Predicate::Or(parts) => {
            for p in parts {
                if matches(p, row, params)? {
                    return Ok(true);
                }
            }
            false
        }
    })
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Postgres orders NULL after every value in ascending order.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LikeToken {
    Literal(char),
    AnyOne,
    AnySeq,
}

/// SQL LIKE with `\` as the escape character.
fn like_match(pattern: &str, text: &str) -> bool {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            '%' => LikeToken::AnySeq,
            '_' => LikeToken::AnyOne,
            other => LikeToken::Literal(other),
        });
    }

    let text: Vec<char> = text.chars().collect();
    let mut dp = vec![vec![false; text.len() + 1]; tokens.len() + 1];
    dp[0][0] = true;
    for i in 1..=tokens.len() {
        if tokens[i - 1] == LikeToken::AnySeq {
            dp[i][0] = dp[i - 1][0];
        }
        for j in 1..=text.len() {
            dp[i][j] = match tokens[i - 1] {
                LikeToken::AnySeq => dp[i - 1][j] || dp[i][j - 1],
                LikeToken::AnyOne => dp[i - 1][j - 1],
                LikeToken::Literal(c) => dp[i - 1][j - 1] && c == text[j - 1],
            };
        }
    }
    dp[tokens.len()][text.len()]
}
