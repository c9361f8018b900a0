use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Value};

/// A value bound positionally to a query, never spliced into its text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl SqlParam {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlParam::Null)
    }

    /// JSON shape of the value as the store hands it back in records.
    pub fn to_json(&self) -> Value {
        match self {
            SqlParam::Null => Value::Null,
            SqlParam::Bool(b) => json!(b),
            SqlParam::Int(i) => json!(i),
            SqlParam::Float(f) => json!(f),
            SqlParam::Text(s) => json!(s),
            SqlParam::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
            SqlParam::Timestamp(t) => json!(t.to_rfc3339_opts(SecondsFormat::Micros, false)),
        }
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<&String> for SqlParam {
    fn from(v: &String) -> Self {
        SqlParam::Text(v.clone())
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v as i64)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(v)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        SqlParam::Date(v)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(v: DateTime<Utc>) -> Self {
        SqlParam::Timestamp(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlParam::Null)
    }
}

/// Store-agnostic predicate tree. Columns are compile-time identifiers and
/// values are referenced by their index in the bound parameter list.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row.
    All,
    Eq { column: &'static str, param: usize },
    Ne { column: &'static str, param: usize },
    /// Case-insensitive LIKE; the parameter holds an escaped pattern.
    ILike { column: &'static str, param: usize },
    In { column: &'static str, params: Vec<usize> },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Every parameter index the predicate refers to, in tree order.
    pub fn param_indexes(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params(&self, out: &mut Vec<usize>) {
        match self {
            Predicate::All => {}
            Predicate::Eq { param, .. } | Predicate::Ne { param, .. } | Predicate::ILike { param, .. } => {
                out.push(*param)
            }
            Predicate::In { params, .. } => out.extend(params.iter().copied()),
            Predicate::And(parts) | Predicate::Or(parts) => {
                for p in parts {
                    p.collect_params(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: &'static str,
    pub sort: SortDirection,
}

impl OrderBy {
    pub fn asc(column: &'static str) -> Self {
        Self { column, sort: SortDirection::Asc }
    }

    pub fn desc(column: &'static str) -> Self {
        Self { column, sort: SortDirection::Desc }
    }
}

/// Output of the predicate builder: the tree plus its parameters in append order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltFilter {
    pub predicate: Predicate,
    pub params: Vec<SqlParam>,
}

impl BuiltFilter {
    pub fn all() -> Self {
        Self { predicate: Predicate::All, params: vec![] }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
