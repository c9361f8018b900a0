use super::types::OrderBy;

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(infos: &[OrderBy]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
