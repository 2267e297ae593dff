//! Chart trace derivation over a normalized track table.
//!
//! Produces renderer-agnostic chart specifications: grouped scatter traces
//! (2D or 3D) and melted polar traces. The UI layer maps these onto its
//! plotting widget; nothing here mutates the table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::table::{Cell, TrackTable};

/// Maximum group-label length before truncation.
pub const GROUP_LABEL_LIMIT: usize = 40;

/// Radial range used when the requested one is degenerate.
const DEFAULT_RADIAL_RANGE: (f64, f64) = (0.0, 1.0);

/// Marker mode for scatter traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TraceMode {
    Markers,
    MarkersAndLines,
}

/// One scatter trace (one color group).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    /// Truncated group label.
    pub name: String,
    pub mode: TraceMode,
    pub x: Vec<Cell>,
    pub y: Vec<Cell>,
    /// Present for the 3D variant.
    pub z: Option<Vec<Cell>>,
}

/// One polar trace (one color group), in melted form: entry `i` is the
/// (row, dimension, value) triple at position `i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarTrace {
    /// Truncated group label.
    pub name: String,
    /// Angular coordinate: dimension name per melted point.
    pub theta: Vec<String>,
    /// Radial coordinate: numeric value per melted point.
    pub r: Vec<f64>,
    /// Source row per melted point.
    pub row_ids: Vec<usize>,
    pub fill: bool,
}

/// A chart specification for the view layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartSpec {
    Scatter {
        traces: Vec<ScatterTrace>,
        x_title: String,
        y_title: String,
        z_title: Option<String>,
    },
    Polar {
        traces: Vec<PolarTrace>,
        radial_range: (f64, f64),
    },
}

impl ChartSpec {
    /// Number of traces in the spec.
    pub fn trace_count(&self) -> usize {
        match self {
            ChartSpec::Scatter { traces, .. } => traces.len(),
            ChartSpec::Polar { traces, .. } => traces.len(),
        }
    }
}

/// Truncate a group label to `limit` characters plus an ellipsis.
pub(crate) fn truncate_label(label: &str, limit: usize) -> String {
    if label.chars().count() > limit {
        let mut out: String = label.chars().take(limit).collect();
        out.push_str("...");
        out
    } else {
        label.to_string()
    }
}

/// Ordered map key wrapping a cell's total order.
struct GroupKey(Cell);

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.compare(&other.0) == std::cmp::Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.compare(&other.0)
    }
}

/// Partition row indices by the color-by column's exact value.
///
/// The key is the cell itself, not its rendering: `Text("1")` and
/// `Number(1.0)` stay in distinct groups. Without a color-by column every
/// row lands in one implicit group with an empty label. Groups come back
/// ordered by key, so output is stable.
fn group_rows(table: &TrackTable, color_by: Option<&str>) -> Vec<(String, Vec<usize>)> {
    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();

    for row in 0..table.len() {
        let key = match color_by {
            Some(column) => table.get(row, column).cloned().unwrap_or(Cell::Missing),
            None => Cell::Missing,
        };
        groups.entry(GroupKey(key)).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(key, rows)| (key.0.to_display(), rows))
        .collect()
}

/// Derive scatter traces for the selected axes.
///
/// One trace per color group: 2D markers (markers+lines sorted by x when
/// `show_lines`) without a z column, 3D markers with one. Missing axes or
/// an empty table yield a spec with no traces.
pub fn render_scatter(
    table: &TrackTable,
    x: &str,
    y: &str,
    z: Option<&str>,
    color_by: Option<&str>,
    show_lines: bool,
) -> ChartSpec {
    let spec_titles = |traces| ChartSpec::Scatter {
        traces,
        x_title: x.to_string(),
        y_title: y.to_string(),
        z_title: z.map(|s| s.to_string()),
    };

    let has_axes = table.column(x).is_some() && table.column(y).is_some();
    if table.is_empty() || !has_axes {
        return spec_titles(Vec::new());
    }

    let mut traces = Vec::new();
    for (label, mut rows) in group_rows(table, color_by) {
        let mode = if show_lines && z.is_none() {
            // Line traces only make sense with x-ordered points.
            rows.sort_by(|a, b| {
                let left = table.get(*a, x).unwrap_or(&Cell::Missing);
                let right = table.get(*b, x).unwrap_or(&Cell::Missing);
                left.compare(right)
            });
            TraceMode::MarkersAndLines
        } else {
            TraceMode::Markers
        };

        let pick = |column: &str| -> Vec<Cell> {
            rows.iter()
                .map(|&row| table.get(row, column).cloned().unwrap_or(Cell::Missing))
                .collect()
        };

        traces.push(ScatterTrace {
            name: truncate_label(&label, GROUP_LABEL_LIMIT),
            mode,
            x: pick(x),
            y: pick(y),
            z: z.map(pick),
        });
    }

    spec_titles(traces)
}

/// Derive polar traces by melting each row across the selected dimensions.
///
/// Each row contributes one (row, dimension, value) triple per numeric
/// dimension value; non-numeric cells are skipped. Fewer than two
/// dimensions yields a spec with no traces. A degenerate radial range
/// (min >= max) falls back to the default.
pub fn render_polar(
    table: &TrackTable,
    dims: &[String],
    color_by: Option<&str>,
    range_min: f64,
    range_max: f64,
    show_lines: bool,
) -> ChartSpec {
    let radial_range = if range_min < range_max {
        (range_min, range_max)
    } else {
        DEFAULT_RADIAL_RANGE
    };

    if table.is_empty() || dims.len() < 2 {
        return ChartSpec::Polar {
            traces: Vec::new(),
            radial_range,
        };
    }

    let mut traces = Vec::new();
    for (label, rows) in group_rows(table, color_by) {
        let mut theta = Vec::new();
        let mut r = Vec::new();
        let mut row_ids = Vec::new();

        for &row in &rows {
            for dim in dims {
                let Some(value) = table.get(row, dim).and_then(|c| c.as_number()) else {
                    continue;
                };
                theta.push(dim.clone());
                r.push(value);
                row_ids.push(row);
            }
        }

        traces.push(PolarTrace {
            name: truncate_label(&label, GROUP_LABEL_LIMIT),
            theta,
            r,
            row_ids,
            fill: show_lines,
        });
    }

    ChartSpec::Polar {
        traces,
        radial_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::NormalizedRow;

    fn row(energy: f64, valence: f64, genre: &str) -> NormalizedRow {
        let mut row = NormalizedRow::new();
        row.insert("audio_feature.energy".to_string(), Cell::Number(energy));
        row.insert("audio_feature.valence".to_string(), Cell::Number(valence));
        row.insert("genre".to_string(), Cell::Text(genre.to_string()));
        row
    }

    fn fixture_table() -> TrackTable {
        TrackTable::from_rows(vec![
            row(0.9, 0.2, "X"),
            row(0.5, 0.6, "X"),
            row(0.1, 0.8, "Y"),
        ])
    }

    #[test]
    fn test_grouping_by_color() {
        let table = fixture_table();
        let spec = render_scatter(
            &table,
            "audio_feature.energy",
            "audio_feature.valence",
            None,
            Some("genre"),
            false,
        );

        let ChartSpec::Scatter { traces, .. } = &spec else {
            panic!("expected scatter spec");
        };
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].name, "X");
        assert_eq!(traces[0].x.len(), 2);
        assert_eq!(traces[1].name, "Y");
        assert_eq!(traces[1].x.len(), 1);
    }

    #[test]
    fn test_typed_color_values_stay_distinct() {
        // A text "1" and a numeric 1 render the same label but are
        // different values, so they form different groups.
        let mut a = NormalizedRow::new();
        a.insert("x".to_string(), Cell::Number(0.1));
        a.insert("y".to_string(), Cell::Number(0.2));
        a.insert("flag".to_string(), Cell::Text("1".to_string()));
        let mut b = NormalizedRow::new();
        b.insert("x".to_string(), Cell::Number(0.3));
        b.insert("y".to_string(), Cell::Number(0.4));
        b.insert("flag".to_string(), Cell::Number(1.0));
        let table = TrackTable::from_rows(vec![a, b]);

        let spec = render_scatter(&table, "x", "y", None, Some("flag"), false);
        let ChartSpec::Scatter { traces, .. } = &spec else {
            panic!("expected scatter spec");
        };
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].name, traces[1].name);
        assert_eq!(traces[0].x.len(), 1);
        assert_eq!(traces[1].x.len(), 1);
    }

    #[test]
    fn test_no_color_by_is_one_group() {
        let table = fixture_table();
        let spec = render_scatter(
            &table,
            "audio_feature.energy",
            "audio_feature.valence",
            None,
            None,
            false,
        );
        assert_eq!(spec.trace_count(), 1);
    }

    #[test]
    fn test_show_lines_sorts_by_x() {
        let table = fixture_table();
        let spec = render_scatter(
            &table,
            "audio_feature.energy",
            "audio_feature.valence",
            None,
            None,
            true,
        );

        let ChartSpec::Scatter { traces, .. } = &spec else {
            panic!("expected scatter spec");
        };
        assert_eq!(traces[0].mode, TraceMode::MarkersAndLines);
        assert_eq!(
            traces[0].x,
            vec![Cell::Number(0.1), Cell::Number(0.5), Cell::Number(0.9)]
        );
    }

    #[test]
    fn test_z_axis_gives_3d_markers() {
        let table = fixture_table();
        let spec = render_scatter(
            &table,
            "audio_feature.energy",
            "audio_feature.valence",
            Some("audio_feature.energy"),
            None,
            true,
        );

        let ChartSpec::Scatter { traces, z_title, .. } = &spec else {
            panic!("expected scatter spec");
        };
        // Lines never apply to the 3D variant.
        assert_eq!(traces[0].mode, TraceMode::Markers);
        assert!(traces[0].z.is_some());
        assert_eq!(z_title.as_deref(), Some("audio_feature.energy"));
    }

    #[test]
    fn test_missing_axis_yields_empty_spec() {
        let table = fixture_table();
        let spec = render_scatter(&table, "nope", "audio_feature.valence", None, None, false);
        assert_eq!(spec.trace_count(), 0);
    }

    #[test]
    fn test_truncation_of_long_group_labels() {
        let long = "x".repeat(50);
        let truncated = truncate_label(&long, GROUP_LABEL_LIMIT);
        assert_eq!(truncated.len(), 43);
        assert_eq!(&truncated[..40], &long[..40]);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_label("short", GROUP_LABEL_LIMIT), "short");
    }

    #[test]
    fn test_polar_melts_rows() {
        let table = fixture_table();
        let dims = vec![
            "audio_feature.energy".to_string(),
            "audio_feature.valence".to_string(),
        ];
        let spec = render_polar(&table, &dims, Some("genre"), 0.0, 1.0, false);

        let ChartSpec::Polar {
            traces,
            radial_range,
        } = &spec
        else {
            panic!("expected polar spec");
        };
        assert_eq!(traces.len(), 2);
        // Group X: 2 rows x 2 dims = 4 melted points.
        assert_eq!(traces[0].r.len(), 4);
        assert_eq!(traces[0].theta[0], "audio_feature.energy");
        assert_eq!(traces[0].theta[1], "audio_feature.valence");
        assert_eq!(traces[0].row_ids, vec![0, 0, 1, 1]);
        assert_eq!(*radial_range, (0.0, 1.0));
    }

    #[test]
    fn test_polar_needs_two_dims() {
        let table = fixture_table();
        let dims = vec!["audio_feature.energy".to_string()];
        let spec = render_polar(&table, &dims, None, 0.0, 1.0, false);
        assert_eq!(spec.trace_count(), 0);
    }

    #[test]
    fn test_polar_degenerate_range_falls_back() {
        let table = fixture_table();
        let dims = vec![
            "audio_feature.energy".to_string(),
            "audio_feature.valence".to_string(),
        ];
        let spec = render_polar(&table, &dims, None, 2.0, 2.0, false);
        let ChartSpec::Polar { radial_range, .. } = spec else {
            panic!("expected polar spec");
        };
        assert_eq!(radial_range, DEFAULT_RADIAL_RANGE);
    }
}
