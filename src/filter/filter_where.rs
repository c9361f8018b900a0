use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::{OrderBy, Predicate, SqlParam, SqlResult};

/// Maps parameter indexes to `$n` placeholders. NULL parameters are rendered
/// as the `NULL` keyword and never bound, so numbering skips them.
#[derive(Debug, Clone)]
pub struct Placeholders {
    numbers: Vec<Option<usize>>,
}

impl Placeholders {
    pub fn for_params(params: &[SqlParam]) -> Self {
        let mut next = 0;
        let numbers = params
            .iter()
            .map(|p| {
                if p.is_null() {
                    None
                } else {
                    next += 1;
                    Some(next)
                }
            })
            .collect();
        Self { numbers }
    }

    /// SQL text for parameter `index`: `$n`, or `NULL` for a null value.
    pub fn render(&self, index: usize) -> Result<String, FilterError> {
        match self.numbers.get(index) {
            Some(Some(n)) => Ok(format!("${}", n)),
            Some(None) => Ok("NULL".to_string()),
            None => Err(FilterError::UnboundParameter(index + 1)),
        }
    }

    fn is_null(&self, index: usize) -> Result<bool, FilterError> {
        self.numbers
            .get(index)
            .map(Option::is_none)
            .ok_or(FilterError::UnboundParameter(index + 1))
    }

    /// Parameters that are actually bound, in placeholder order.
    pub fn bound(params: &[SqlParam]) -> Vec<SqlParam> {
        params.iter().filter(|p| !p.is_null()).cloned().collect()
    }
}

pub struct FilterWhere<'a> {
    placeholders: &'a Placeholders,
}

impl<'a> FilterWhere<'a> {
    pub fn new(placeholders: &'a Placeholders) -> Self {
        Self { placeholders }
    }

    /// Renders a predicate against an already-numbered parameter list.
    pub fn generate(predicate: &Predicate, placeholders: &Placeholders) -> Result<String, FilterError> {
        FilterWhere::new(placeholders).build(predicate)
    }

    /// Full `SELECT` returning each row as one JSON object.
    pub fn to_select_sql(
        table: &str,
        predicate: &Predicate,
        params: &[SqlParam],
        order: &[OrderBy],
    ) -> Result<SqlResult, FilterError> {
        let placeholders = Placeholders::for_params(params);
        let where_clause = Self::generate(predicate, &placeholders)?;
        let order_clause = FilterOrder::generate(order);

        let query = [
            "SELECT row_to_json(t) AS row".to_string(),
            format!("FROM \"{}\" t", table),
            format!("WHERE {}", where_clause),
            order_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params: Placeholders::bound(params) })
    }

    fn build(&self, predicate: &Predicate) -> Result<String, FilterError> {
        match predicate {
            Predicate::All => Ok("1=1".to_string()),
            Predicate::Eq { column, param } => {
                if self.placeholders.is_null(*param)? {
                    Ok(format!("\"{}\" IS NULL", column))
                } else {
                    Ok(format!("\"{}\" = {}", column, self.placeholders.render(*param)?))
                }
            }
            Predicate::Ne { column, param } => {
                if self.placeholders.is_null(*param)? {
                    Ok(format!("\"{}\" IS NOT NULL", column))
                } else {
                    Ok(format!("\"{}\" <> {}", column, self.placeholders.render(*param)?))
                }
            }
            Predicate::ILike { column, param } => {
                Ok(format!("\"{}\" ILIKE {}", column, self.placeholders.render(*param)?))
            }
            Predicate::In { column, params } => {
                if params.is_empty() {
                    return Ok("1=0".to_string());
                }
                let rendered = params
                    .iter()
                    .map(|p| self.placeholders.render(*p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("\"{}\" IN ({})", column, rendered.join(", ")))
            }
            Predicate::And(parts) => self.join(parts, " AND ", "1=1"),
            Predicate::Or(parts) => self.join(parts, " OR ", "1=0"),
        }
    }

    fn join(&self, parts: &[Predicate], joiner: &str, empty: &str) -> Result<String, FilterError> {
        if parts.is_empty() {
            return Ok(empty.to_string());
        }
        let rendered = parts
            .iter()
            .map(|p| self.build(p).map(|sql| format!("({})", sql)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join(joiner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PredicateBuilder;

    #[test]
    fn renders_all_as_tautology() {
        let placeholders = Placeholders::for_params(&[]);
        assert_eq!(FilterWhere::generate(&Predicate::All, &placeholders).unwrap(), "1=1");
    }

    #[test]
    fn renders_positional_placeholders() {
        let built = PredicateBuilder::new()
            .eq("tipo", "perro")
            .contains_any(&["nombre", "raza"], "lu")
            .build();
        let placeholders = Placeholders::for_params(&built.params);
        let sql = FilterWhere::generate(&built.predicate, &placeholders).unwrap();
        assert_eq!(sql, "(\"tipo\" = $1) AND ((\"nombre\" ILIKE $2) OR (\"raza\" ILIKE $3))");
    }

    #[test]
    fn values_never_appear_in_sql_text() {
        let hostile = "'; DROP TABLE animales; --";
        let built = PredicateBuilder::new()
            .eq("tipo", hostile)
            .contains_any(&["nombre"], hostile)
            .build();
        let result = FilterWhere::to_select_sql("animales", &built.predicate, &built.params, &[]).unwrap();
        assert!(!result.query.contains("DROP"));
        assert_eq!(result.params.len(), 2);
    }

    #[test]
    fn null_parameters_render_as_keywords_and_skip_numbering() {
        let built = PredicateBuilder::new()
            .eq("id_usuario", SqlParam::Null)
            .ne("estado", SqlParam::Null)
            .eq("tipo", "gato")
            .build();
        let result = FilterWhere::to_select_sql("animales", &built.predicate, &built.params, &[]).unwrap();
        assert!(result.query.contains("(\"id_usuario\" IS NULL) AND (\"estado\" IS NOT NULL) AND (\"tipo\" = $1)"));
        assert_eq!(result.params, vec![SqlParam::from("gato")]);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let built = PredicateBuilder::new().is_in("id_animal", Vec::<i64>::new()).build();
        let placeholders = Placeholders::for_params(&built.params);
        assert_eq!(FilterWhere::generate(&built.predicate, &placeholders).unwrap(), "(1=0)");
    }

    #[test]
    fn out_of_range_parameter_is_an_error() {
        let placeholders = Placeholders::for_params(&[]);
        let predicate = Predicate::Eq { column: "tipo", param: 0 };
        assert!(matches!(
            FilterWhere::generate(&predicate, &placeholders),
            Err(FilterError::UnboundParameter(1))
        ));
    }

    #[test]
    fn select_sql_includes_order() {
        let result = FilterWhere::to_select_sql(
            "animales",
            &Predicate::All,
            &[],
            &[OrderBy::desc("fecha_ingreso")],
        )
        .unwrap();
        assert_eq!(
            result.query,
            "SELECT row_to_json(t) AS row FROM \"animales\" t WHERE 1=1 ORDER BY \"fecha_ingreso\" DESC"
        );
    }
}
