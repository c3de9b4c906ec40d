//! Row-mapping tables handed to the rendering layer.
//!
//! Every derived view converts itself into a `Table`: an ordered column list
//! plus one JSON object per row. Missing values are `null`.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; `values` are matched to `columns` by position.
    ///
    /// Missing trailing values are stored as `null`; extra values are dropped.
    pub fn push_row(&mut self, values: Vec<Value>) {
        let mut values = values.into_iter();
        let row = self
            .columns
            .iter()
            .map(|column| (column.clone(), values.next().unwrap_or(Value::Null)))
            .collect();
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom. Empty if the column is unknown.
    pub fn column(&self, name: &str) -> Vec<&Value> {
        if !self.columns.iter().any(|c| c == name) {
            return Vec::new();
        }
        self.rows.iter().filter_map(|row| row.get(name)).collect()
    }
}

/// A number, or `null` for a missing value or a non-finite result.
pub fn number(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// A number formatted with two decimals for display, or `null`.
pub fn two_decimals(value: Option<f64>) -> Value {
    match value {
        Some(v) if v.is_finite() => Value::String(format!("{:.2}", v)),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_row_maps_values_to_columns() {
        let mut table = Table::new(["Site", "GHI"]);
        table.push_row(vec![json!("Benin"), json!(240.5)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0]["Site"], json!("Benin"));
        assert_eq!(table.rows[0]["GHI"], json!(240.5));
    }

    #[test]
    fn test_push_row_pads_missing_values_with_null() {
        let mut table = Table::new(["a", "b", "c"]);
        table.push_row(vec![json!(1)]);
        assert_eq!(table.rows[0]["b"], Value::Null);
        assert_eq!(table.rows[0]["c"], Value::Null);
    }

    #[test]
    fn test_column_returns_values_in_row_order() {
        let mut table = Table::new(["n"]);
        for i in 0..3 {
            table.push_row(vec![json!(i)]);
        }
        assert_eq!(table.column("n"), vec![&json!(0), &json!(1), &json!(2)]);
        assert!(table.column("missing").is_empty());
    }

    #[test]
    fn test_number_and_two_decimals_null_out_missing_and_nan() {
        assert_eq!(number(None), Value::Null);
        assert_eq!(number(Some(f64::NAN)), Value::Null);
        assert_eq!(two_decimals(Some(f64::INFINITY)), Value::Null);
        assert_eq!(two_decimals(Some(20.0)), json!("20.00"));
        assert_eq!(two_decimals(Some(1.005)), json!("1.00"));
    }
}
