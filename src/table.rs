//! Tabular representation of normalized track data.
//!
//! Raw API payloads are duck-typed JSON; everything that reaches a table
//! goes through [`Cell`], a tagged scalar, and [`flatten_record`], which
//! reports container values it cannot represent instead of stringifying
//! them.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::diag::{DiagnosticKind, Diagnostics};

/// A single table value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Absent or unrepresentable value (rendered as null).
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    /// Convert a scalar JSON value. Containers yield `None`.
    pub fn from_scalar(value: &Value) -> Option<Cell> {
        match value {
            Value::Null => Some(Cell::Missing),
            Value::Bool(b) => Some(Cell::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Cell::Number),
            Value::String(s) => Some(Cell::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric view, for chart coordinates.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Display form, used for group labels and table rendering.
    pub fn to_display(&self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Timestamp(t) => t.to_rfc3339(),
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Cell::Missing => 0,
            Cell::Bool(_) => 1,
            Cell::Number(_) => 2,
            Cell::Timestamp(_) => 3,
            Cell::Text(_) => 4,
        }
    }

    /// Total ordering across cells: within a variant the natural order,
    /// across variants a fixed rank. Used for x-sorting and group ordering.
    pub fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Bool(a), Cell::Bool(b)) => a.cmp(b),
            (Cell::Number(a), Cell::Number(b)) => a.total_cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (Cell::Timestamp(a), Cell::Timestamp(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

/// One normalized row: dotted field path to scalar value.
pub type NormalizedRow = BTreeMap<String, Cell>;

/// Flatten a JSON object into dotted-path keys.
///
/// Nested objects recurse (`album.release_date`); null, scalars and
/// arrays-of-scalars pass through unchanged. Arrays containing objects or
/// nested arrays cannot be represented and are dropped with a diagnostic.
pub(crate) fn flatten_record(record: &Value, diag: &mut Diagnostics) -> BTreeMap<String, Value> {
    let mut flat = BTreeMap::new();
    flatten_into("", record, &mut flat, diag);
    flat
}

fn flatten_into(
    prefix: &str,
    value: &Value,
    out: &mut BTreeMap<String, Value>,
    diag: &mut Diagnostics,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&path, child, out, diag);
            }
        }
        Value::Array(items) => {
            if items.iter().all(|v| !v.is_object() && !v.is_array()) {
                out.insert(prefix.to_string(), value.clone());
            } else {
                diag.record(
                    DiagnosticKind::FieldDropped,
                    format!("cannot flatten nested array in `{}`", prefix),
                );
            }
        }
        _ => {
            out.insert(prefix.to_string(), value.clone());
        }
    }
}

/// The flattened, merged track data for one playlist selection.
///
/// Columns are the sorted union of all row keys; every row carries the full
/// column set with `Cell::Missing` for absent values. A table is created
/// fresh on every load and replaced wholesale, never mutated by the view
/// layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackTable {
    columns: Vec<String>,
    rows: Vec<NormalizedRow>,
}

impl TrackTable {
    /// Build a table from rows, taking the column union and filling gaps.
    pub fn from_rows(rows: Vec<NormalizedRow>) -> Self {
        let columns: BTreeSet<String> = rows.iter().flat_map(|r| r.keys().cloned()).collect();

        let rows = rows
            .into_iter()
            .map(|mut row| {
                for col in &columns {
                    row.entry(col.clone()).or_insert(Cell::Missing);
                }
                row
            })
            .collect();

        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Column names, sorted.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    /// Cell at (row, column), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        if !self.columns.iter().any(|c| c == name) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|r| r.get(name).unwrap_or(&Cell::Missing))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_object() {
        let mut diag = Diagnostics::new();
        let record = json!({
            "name": "Song",
            "album": {"release_date": "2020-01-01", "total_tracks": 12},
            "duration_ms": 215000
        });

        let flat = flatten_record(&record, &mut diag);
        assert_eq!(flat["name"], json!("Song"));
        assert_eq!(flat["album.release_date"], json!("2020-01-01"));
        assert_eq!(flat["album.total_tracks"], json!(12));
        assert_eq!(flat["duration_ms"], json!(215000));
        assert!(diag.is_empty());
    }

    #[test]
    fn test_flatten_keeps_scalar_arrays() {
        let mut diag = Diagnostics::new();
        let record = json!({"available_markets": ["US", "GB"]});

        let flat = flatten_record(&record, &mut diag);
        assert_eq!(flat["available_markets"], json!(["US", "GB"]));
    }

    #[test]
    fn test_flatten_rejects_arrays_of_objects() {
        let mut diag = Diagnostics::new();
        let record = json!({
            "name": "Song",
            "album": {"images": [{"url": "http://x", "height": 64}]}
        });

        let flat = flatten_record(&record, &mut diag);
        assert!(!flat.contains_key("album.images"));
        assert!(flat.contains_key("name"));
        assert_eq!(diag.count(DiagnosticKind::FieldDropped), 1);
    }

    #[test]
    fn test_from_rows_fills_missing() {
        let mut a = NormalizedRow::new();
        a.insert("x".to_string(), Cell::Number(1.0));
        let mut b = NormalizedRow::new();
        b.insert("y".to_string(), Cell::Text("hi".to_string()));

        let table = TrackTable::from_rows(vec![a, b]);
        assert_eq!(table.columns(), &["x".to_string(), "y".to_string()]);
        assert_eq!(table.get(0, "y"), Some(&Cell::Missing));
        assert_eq!(table.get(1, "x"), Some(&Cell::Missing));
        assert_eq!(table.get(1, "y"), Some(&Cell::Text("hi".to_string())));
    }

    #[test]
    fn test_cell_compare() {
        assert_eq!(
            Cell::Number(1.0).compare(&Cell::Number(2.0)),
            Ordering::Less
        );
        assert_eq!(
            Cell::Text("b".into()).compare(&Cell::Text("a".into())),
            Ordering::Greater
        );
        assert_eq!(
            Cell::Missing.compare(&Cell::Number(0.0)),
            Ordering::Less
        );
    }

    #[test]
    fn test_cell_as_number() {
        assert_eq!(Cell::Number(0.5).as_number(), Some(0.5));
        assert_eq!(Cell::Bool(true).as_number(), Some(1.0));
        assert_eq!(Cell::Text("x".into()).as_number(), None);
    }
}
