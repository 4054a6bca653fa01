use serde_json::Value;

use crate::domain::model::{Document, ID_FIELD};

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq { field: String, value: Value },
    /// Inclusive numeric range; documents without a numeric value never match.
    Range {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Case-insensitive substring match against any of the fields.
    Text { fields: Vec<String>, query: String },
}

/// A conjunction of conditions. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn range(mut self, field: &str, min: Option<f64>, max: Option<f64>) -> Self {
        if min.is_some() || max.is_some() {
            self.conditions.push(Condition::Range {
                field: field.to_string(),
                min,
                max,
            });
        }
        self
    }

    pub fn text(mut self, fields: &[&str], query: &str) -> Self {
        let query = query.trim();
        if !query.is_empty() {
            self.conditions.push(Condition::Text {
                fields: fields.iter().map(|f| f.to_string()).collect(),
                query: query.to_lowercase(),
            });
        }
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|condition| condition.matches(document))
    }
}

impl Condition {
    fn matches(&self, document: &Document) -> bool {
        match self {
            Condition::Eq { field, value } => document
                .get(field)
                .is_some_and(|actual| values_equal(actual, value)),
            Condition::Range { field, min, max } => {
                let Some(actual) = document.get(field).and_then(Value::as_f64) else {
                    return false;
                };
                min.map_or(true, |min| actual >= min) && max.map_or(true, |max| actual <= max)
            }
            Condition::Text { fields, query } => fields.iter().any(|field| {
                document
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(query.as_str()))
            }),
        }
    }
}

// 數字比較不區分整數與浮點數 (1 == 1.0)
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => actual == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().matches(&doc(json!({"a": 1}))));
    }

    #[test]
    fn test_eq_treats_int_and_float_alike() {
        let d = doc(json!({"bedrooms": 3, "city": "Austin"}));
        assert!(Filter::new().eq("bedrooms", 3.0).matches(&d));
        assert!(Filter::new().eq("city", "Austin").matches(&d));
        assert!(!Filter::new().eq("city", "austin").matches(&d));
        assert!(!Filter::new().eq("missing", "x").matches(&d));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let d = doc(json!({"price": 300000}));
        assert!(Filter::new().range("price", Some(300000.0), None).matches(&d));
        assert!(Filter::new().range("price", None, Some(300000.0)).matches(&d));
        assert!(!Filter::new().range("price", Some(300000.5), None).matches(&d));
        assert!(!Filter::new()
            .range("price", Some(1.0), None)
            .matches(&doc(json!({"price": null}))));
    }

    #[test]
    fn test_text_search_any_field_case_insensitive() {
        let d = doc(json!({"title": "Cozy Family Home", "city": "Denver"}));
        let filter = Filter::new().text(&["title", "city"], "DENV");
        assert!(filter.matches(&d));
        assert!(!Filter::new().text(&["title"], "denver").matches(&d));
        // blank queries add no condition
        assert!(Filter::new().text(&["title"], "  ").conditions().is_empty());
    }
}
