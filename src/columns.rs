//! Column classification for table display and chart axis selection.

use serde::Serialize;

use crate::table::TrackTable;

/// A column as offered to the table widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub id: String,
    pub name: String,
    pub hideable: bool,
}

/// An axis/color-by choice as offered to the chart dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisOption {
    pub label: String,
    pub value: String,
}

/// The three derived column views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnViews {
    /// All columns, sorted by name, for table display.
    pub all: Vec<ColumnDescriptor>,
    /// Columns hidden by default.
    pub hidden: Vec<String>,
    /// Columns offered as chart-axis/color-by choices, sorted by label.
    pub axis_candidates: Vec<AxisOption>,
}

/// Identifier-ish and URL-ish columns are noise in the table; hide them by
/// default. Fixed policy, reproduced exactly for compatibility.
fn is_hidden(name: &str) -> bool {
    name.ends_with(".uri")
        || name.ends_with(".id")
        || name.ends_with("available_markets")
        || name.ends_with("isrc")
        || name.contains("_url")
        || name.contains("href")
        || name == "id"
}

/// Classify a table's columns without mutating the table.
///
/// Output is order-stable: classifying the same table twice yields
/// identical results.
pub fn classify_columns(table: &TrackTable) -> ColumnViews {
    let mut all: Vec<ColumnDescriptor> = table
        .columns()
        .iter()
        .map(|col| ColumnDescriptor {
            id: col.clone(),
            name: col.clone(),
            hideable: true,
        })
        .collect();
    all.sort_by(|a, b| a.name.cmp(&b.name));

    let hidden: Vec<String> = table
        .columns()
        .iter()
        .filter(|col| is_hidden(col))
        .cloned()
        .collect();

    let mut axis_candidates: Vec<AxisOption> = table
        .columns()
        .iter()
        .map(|col| AxisOption {
            label: col.clone(),
            value: col.clone(),
        })
        .collect();
    axis_candidates.sort_by(|a, b| a.label.cmp(&b.label));

    ColumnViews {
        all,
        hidden,
        axis_candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, NormalizedRow};

    fn table_with_columns(names: &[&str]) -> TrackTable {
        let mut row = NormalizedRow::new();
        for name in names {
            row.insert(name.to_string(), Cell::Number(1.0));
        }
        TrackTable::from_rows(vec![row])
    }

    #[test]
    fn test_hidden_rules() {
        assert!(is_hidden("track.uri"));
        assert!(is_hidden("album.id"));
        assert!(is_hidden("album.available_markets"));
        assert!(is_hidden("available_markets"));
        assert!(is_hidden("external_ids.isrc"));
        assert!(is_hidden("external_urls.spotify"));
        assert!(is_hidden("track.href"));
        assert!(is_hidden("id"));

        assert!(!is_hidden("album.release_date"));
        assert!(!is_hidden("audio_feature.energy"));
        assert!(!is_hidden("name"));
        // Substring rules need `_url`/`href`, not just `url`.
        assert!(!is_hidden("curl_count"));
    }

    #[test]
    fn test_classify_partitions() {
        let table = table_with_columns(&["name", "id", "track.href", "album.release_date"]);
        let views = classify_columns(&table);

        assert_eq!(views.all.len(), 4);
        assert!(views.all.iter().all(|c| c.hideable));
        assert_eq!(
            views.hidden,
            vec!["id".to_string(), "track.href".to_string()]
        );
        assert_eq!(views.axis_candidates.len(), 4);
        assert_eq!(views.axis_candidates[0].label, "album.release_date");
    }

    #[test]
    fn test_classify_is_idempotent() {
        let table = table_with_columns(&["b", "a", "c.uri", "external_urls.spotify"]);
        let first = classify_columns(&table);
        let second = classify_columns(&table);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_table() {
        let views = classify_columns(&TrackTable::default());
        assert!(views.all.is_empty());
        assert!(views.hidden.is_empty());
        assert!(views.axis_candidates.is_empty());
    }
}
