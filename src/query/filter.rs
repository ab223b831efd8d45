//! # Filter Predicates
//!
//! Typed row predicates. Filters in a set compose by AND, evaluated in
//! declaration order.

use serde::Serialize;
use serde_json::Value;

use crate::fixtures::Row;

/// A predicate over one column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Column equals value (exact JSON equality)
    Equals { column: String, value: Value },

    /// Column value is a member of the set
    MemberOf { column: String, values: Vec<Value> },
}

impl Filter {
    /// Create an equality filter
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a set-membership filter
    pub fn member_of<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::MemberOf {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The column this filter inspects
    pub fn column(&self) -> &str {
        match self {
            Filter::Equals { column, .. } | Filter::MemberOf { column, .. } => column,
        }
    }

    /// Operator name as used in query strings
    pub fn operator(&self) -> &'static str {
        match self {
            Filter::Equals { .. } => "eq",
            Filter::MemberOf { .. } => "in",
        }
    }

    /// Check if a row matches this filter.
    ///
    /// A row lacking the column never matches.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(field_value) = row.get(self.column()) else {
            return false;
        };

        match self {
            Filter::Equals { value, .. } => field_value == value,
            Filter::MemberOf { values, .. } => values.contains(field_value),
        }
    }
}

/// A set of filters combined with AND logic
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn and(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Check if a row matches all filters
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Keep only the rows matching all filters, preserving order
    pub fn apply(&self, rows: Vec<Row>) -> Vec<Row> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::into_row;
    use serde_json::json;

    fn row(value: Value) -> Row {
        into_row(value).unwrap()
    }

    #[test]
    fn test_eq_filter() {
        let filter = Filter::equals("status", "published");

        assert!(filter.matches(&row(json!({"status": "published"}))));
        assert!(!filter.matches(&row(json!({"status": "draft"}))));
    }

    #[test]
    fn test_eq_is_type_strict() {
        let filter = Filter::equals("id", "1");

        assert!(!filter.matches(&row(json!({"id": 1}))));
        assert!(filter.matches(&row(json!({"id": "1"}))));
    }

    #[test]
    fn test_missing_column_never_matches() {
        assert!(!Filter::equals("nope", Value::Null).matches(&row(json!({"id": "1"}))));
        assert!(!Filter::member_of("nope", [Value::Null]).matches(&row(json!({"id": "1"}))));
    }

    #[test]
    fn test_in_filter() {
        let filter = Filter::member_of("status", ["active", "pending"]);

        assert!(filter.matches(&row(json!({"status": "active"}))));
        assert!(filter.matches(&row(json!({"status": "pending"}))));
        assert!(!filter.matches(&row(json!({"status": "inactive"}))));
    }

    #[test]
    fn test_in_empty_set_matches_nothing() {
        let filter = Filter::member_of("status", Vec::<Value>::new());
        assert!(!filter.matches(&row(json!({"status": "active"}))));
    }

    #[test]
    fn test_filter_set() {
        let filters = FilterSet::new()
            .and(Filter::equals("status", "active"))
            .and(Filter::member_of("age", [21, 30]));

        assert!(filters.matches(&row(json!({"status": "active", "age": 21}))));
        assert!(!filters.matches(&row(json!({"status": "inactive", "age": 21}))));
        assert!(!filters.matches(&row(json!({"status": "active", "age": 22}))));
    }

    #[test]
    fn test_empty_set_matches_everything() {
        assert!(FilterSet::new().matches(&row(json!({}))));
    }

    #[test]
    fn test_apply_preserves_order() {
        let rows = vec![
            row(json!({"id": "a", "k": 1})),
            row(json!({"id": "b", "k": 2})),
            row(json!({"id": "c", "k": 1})),
        ];
        let kept = FilterSet::new().and(Filter::equals("k", 1)).apply(rows);

        let ids: Vec<_> = kept.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("c")]);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(Filter::equals("status", "draft")).unwrap();
        assert_eq!(value["kind"], "equals");
        assert_eq!(value["column"], "status");
        assert_eq!(Filter::member_of("a", [1]).operator(), "in");
    }
}
