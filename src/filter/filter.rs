use super::types::{BuiltFilter, Predicate, SqlParam};

/// Incrementally builds a conjunctive predicate. Every value goes into the
/// parameter list; the tree only records where it is referenced.
#[derive(Debug, Default)]
pub struct PredicateBuilder {
    conditions: Vec<Predicate>,
    params: Vec<SqlParam>,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after parameters already used by a statement
    /// (e.g. the SET list of an UPDATE).
    pub fn continuing(params: Vec<SqlParam>) -> Self {
        Self { conditions: vec![], params }
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<SqlParam>) -> Self {
        let param = self.param(value.into());
        self.conditions.push(Predicate::Eq { column, param });
        self
    }

    /// Equality only when a non-blank value is present.
    pub fn eq_present(self, column: &'static str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn ne(mut self, column: &'static str, value: impl Into<SqlParam>) -> Self {
        let param = self.param(value.into());
        self.conditions.push(Predicate::Ne { column, param });
        self
    }

    pub fn is_in<I, V>(mut self, column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlParam>,
    {
        let params = values.into_iter().map(|v| self.param(v.into())).collect();
        self.conditions.push(Predicate::In { column, params });
        self
    }

    /// OR of case-insensitive substring matches, one parameter per column.
    pub fn contains_any(mut self, columns: &[&'static str], term: &str) -> Self {
        let pattern = format!("%{}%", escape_like(term));
        let parts = columns
            .iter()
            .map(|&column| {
                let param = self.param(SqlParam::Text(pattern.clone()));
                Predicate::ILike { column, param }
            })
            .collect();
        self.conditions.push(Predicate::Or(parts));
        self
    }

    pub fn build(self) -> BuiltFilter {
        let predicate = if self.conditions.is_empty() {
            Predicate::All
        } else {
            Predicate::And(self.conditions)
        };
        BuiltFilter { predicate, params: self.params }
    }

    fn param(&mut self, value: SqlParam) -> usize {
        self.params.push(value);
        self.params.len() - 1
    }
}

/// Escapes LIKE metacharacters so the term is matched literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
