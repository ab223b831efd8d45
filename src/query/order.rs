//! Result ordering
//!
//! Every declared order is a full re-sort from the filtered snapshot, so
//! only the last declared `OrderSpec` shapes the result. Sorting is stable:
//! rows that compare equal keep their table order.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::fixtures::Row;

/// One ordering clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSpec {
    pub column: String,
    pub ascending: bool,
}

impl OrderSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// Sorts rows by this clause. Stable and deterministic.
    pub fn sort(&self, rows: &mut [Row]) {
        rows.sort_by(|a, b| {
            let ordering = compare_values(a.get(&self.column), b.get(&self.column));
            if self.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}

/// Apply declared orders to rows already in table order.
///
/// Each clause re-sorts from the same starting order, so the net effect is
/// the final clause alone.
pub fn apply_orders(rows: &mut [Row], orders: &[OrderSpec]) {
    if let Some(last) = orders.last() {
        last.sort(rows);
    }
}

/// Compares two JSON values for sorting.
///
/// Ordering rules:
/// - missing < present
/// - null < bool < number < string < array < object
/// - For same types, natural ordering; ISO-8601 timestamps sort as strings
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            let type_order = |v: &Value| -> u8 {
                match v {
                    Value::Null => 0,
                    Value::Bool(_) => 1,
                    Value::Number(_) => 2,
                    Value::String(_) => 3,
                    Value::Array(_) => 4,
                    Value::Object(_) => 5,
                }
            };

            let a_type = type_order(a_val);
            let b_type = type_order(b_val);

            if a_type != b_type {
                return a_type.cmp(&b_type);
            }

            match (a_val, b_val) {
                (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                (Value::Number(a_n), Value::Number(b_n)) => {
                    let a_f = a_n.as_f64().unwrap_or(0.0);
                    let b_f = b_n.as_f64().unwrap_or(0.0);
                    a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                }
                (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
                _ => Ordering::Equal,
            }
        }
    }
}
