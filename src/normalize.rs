//! Track-data normalization pipeline.
//!
//! Pulls all pages of the selected playlists, merges per-track audio
//! features, deduplicates, and flattens everything into a uniform
//! [`TrackTable`]. Remote failures for one playlist never abort the others;
//! the pipeline degrades to a partial (or empty) table and reports what it
//! skipped through the [`Diagnostics`] sink.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::api::SpotifyApi;
use crate::diag::{DiagnosticKind, Diagnostics};
use crate::error::Result;
use crate::models::Playlist;
use crate::table::{flatten_record, Cell, NormalizedRow, TrackTable};

/// Fixed server-side page size for playlist items.
pub const PAGE_SIZE: u32 = 100;

/// Namespace prefix for merged audio-feature fields.
const FEATURE_PREFIX: &str = "audio_feature.";

/// Column injected to record playlist membership.
const PLAYLIST_TAG: &str = "user_playlist";

/// Columns parsed into timestamps, created as all-missing when absent.
const DATE_COLUMNS: &[&str] = &["added_at", "album.release_date"];

/// Load and normalize tracks for a playlist selection.
///
/// Missing auth token or an empty selection yields an empty table, not an
/// error. A fetch failure for one playlist skips that playlist and
/// continues with the rest.
pub async fn load_tracks(
    api: &SpotifyApi,
    playlists: &[Playlist],
    diag: &mut Diagnostics,
) -> Result<TrackTable> {
    if !api.is_authenticated() || playlists.is_empty() {
        return Ok(TrackTable::default());
    }

    let mut records: Vec<Value> = Vec::new();
    for playlist in playlists {
        if let Err(e) = collect_playlist(api, playlist, &mut records, diag).await {
            diag.record(
                DiagnosticKind::PlaylistSkipped,
                format!("playlist `{}` skipped: {}", playlist.id, e),
            );
        }
    }

    info!("normalizing {} track record(s)", records.len());
    Ok(build_table(records, diag))
}

/// Page through one playlist and merge its items into `records`.
async fn collect_playlist(
    api: &SpotifyApi,
    playlist: &Playlist,
    records: &mut Vec<Value>,
    diag: &mut Diagnostics,
) -> Result<()> {
    let first = api.playlist_items(&playlist.id, 0, PAGE_SIZE).await?;

    let total = match first.total {
        Some(total) => total,
        None => {
            diag.record(
                DiagnosticKind::PlaylistSkipped,
                format!("playlist `{}` reported no item total", playlist.id),
            );
            return Ok(());
        }
    };

    let mut fetched = first.items.len() as u64;
    merge_page(api, &first.items, &playlist.display_name, records, diag).await?;

    while fetched < total {
        let page = api.playlist_items(&playlist.id, fetched, PAGE_SIZE).await?;
        if page.items.is_empty() {
            // Partial response; stop early rather than loop forever.
            break;
        }
        fetched += page.items.len() as u64;
        merge_page(api, &page.items, &playlist.display_name, records, diag).await?;
    }

    debug!(
        "playlist `{}`: fetched {}/{} item(s)",
        playlist.id, fetched, total
    );
    Ok(())
}

/// Fetch audio features for one page and merge the batch.
async fn merge_page(
    api: &SpotifyApi,
    items: &[Value],
    playlist_name: &str,
    records: &mut Vec<Value>,
    diag: &mut Diagnostics,
) -> Result<()> {
    // Items without a track URI (e.g. removed local files) cannot be part
    // of the feature batch; filtering them up front keeps the positional
    // pairing between request and response intact.
    let items: Vec<Value> = items
        .iter()
        .filter(|item| {
            item.get("track")
                .and_then(|t| t.get("uri"))
                .and_then(|u| u.as_str())
                .is_some()
        })
        .cloned()
        .collect();

    let uris: Vec<String> = items
        .iter()
        .filter_map(|item| {
            item.get("track")
                .and_then(|t| t.get("uri"))
                .and_then(|u| u.as_str())
                .map(|s| s.to_string())
        })
        .collect();

    let features = api.audio_features(&uris).await?;
    merge_batch(&items, &features, playlist_name, records, diag);
    Ok(())
}

/// Merge one page of playlist items with its audio-feature batch.
///
/// Pairing is positional: feature record `i` belongs to track `i` of the
/// same batch. The remote endpoint returns results in request order; this
/// pairing is the ordering invariant the tests pin down.
pub(crate) fn merge_batch(
    items: &[Value],
    features: &[Value],
    playlist_name: &str,
    records: &mut Vec<Value>,
    diag: &mut Diagnostics,
) {
    for (index, item) in items.iter().enumerate() {
        let Some(Value::Object(track_obj)) = item.get("track") else {
            debug!("skipping item {} without track object", index);
            continue;
        };
        let mut track = track_obj.clone();

        // Namespaced feature fields, paired by position.
        if let Some(Value::Object(feat)) = features.get(index) {
            for (key, value) in feat {
                track.insert(format!("{}{}", FEATURE_PREFIX, key), value.clone());
            }
        }

        // Scalar wrapper fields (added_at etc). Container values cannot be
        // merged onto the track and are reported, never coerced.
        if let Some(wrapper) = item.as_object() {
            for (key, value) in wrapper {
                if key == "track" {
                    continue;
                }
                if value.is_object() || value.is_array() {
                    diag.record(
                        DiagnosticKind::FieldDropped,
                        format!("not adding container wrapper field `{}`", key),
                    );
                    continue;
                }
                track.insert(key.clone(), value.clone());
            }
        }

        let candidate = Value::Object(track);

        // Dedup by full structural equality, ignoring the playlist tag: a
        // track already seen keeps its first playlist's tag.
        let key = without_playlist_tag(&candidate);
        if records.iter().any(|r| without_playlist_tag(r) == key) {
            continue;
        }

        let mut tagged = candidate;
        if let Some(obj) = tagged.as_object_mut() {
            obj.insert(
                PLAYLIST_TAG.to_string(),
                Value::String(playlist_name.to_string()),
            );
        }
        records.push(tagged);
    }
}

fn without_playlist_tag(record: &Value) -> Value {
    let mut copy = record.clone();
    if let Some(obj) = copy.as_object_mut() {
        obj.remove(PLAYLIST_TAG);
    }
    copy
}

/// Flatten accumulated records into a uniform table.
///
/// Applies the artist collapse, the list join-or-drop rule, and date
/// parsing for the known date columns.
pub(crate) fn build_table(records: Vec<Value>, diag: &mut Diagnostics) -> TrackTable {
    let mut flat_rows: Vec<BTreeMap<String, Value>> = Vec::with_capacity(records.len());
    for mut record in records {
        collapse_artists(&mut record);
        flat_rows.push(flatten_record(&record, diag));
    }

    let columns: BTreeSet<String> = flat_rows.iter().flat_map(|r| r.keys().cloned()).collect();

    join_list_columns(&columns, &mut flat_rows, diag);

    let mut rows: Vec<NormalizedRow> = flat_rows
        .into_iter()
        .map(|flat| {
            flat.iter()
                .map(|(key, value)| {
                    let cell = Cell::from_scalar(value).unwrap_or(Cell::Missing);
                    (key.clone(), cell)
                })
                .collect()
        })
        .collect();

    parse_date_columns(&mut rows, diag);

    TrackTable::from_rows(rows)
}

/// Collapse a list-of-artist-objects into comma-joined, sorted names.
fn collapse_artists(record: &mut Value) {
    let Some(obj) = record.as_object_mut() else {
        return;
    };
    let Some(Value::Array(artists)) = obj.get("artists") else {
        return;
    };

    let mut names: Vec<String> = artists
        .iter()
        .filter_map(|a| a.get("name").and_then(|n| n.as_str()))
        .map(|s| s.to_string())
        .collect();
    names.sort();

    obj.insert("artists".to_string(), Value::String(names.join(", ")));
}

/// Join list-valued columns with `/`, or drop them entirely.
///
/// A column qualifies as soon as any row holds a list. Every present value
/// must then be a list of strings; one type mismatch drops the column from
/// all rows.
fn join_list_columns(
    columns: &BTreeSet<String>,
    rows: &mut [BTreeMap<String, Value>],
    diag: &mut Diagnostics,
) {
    for column in columns {
        let has_lists = rows.iter().any(|r| matches!(r.get(column), Some(Value::Array(_))));
        if !has_lists {
            continue;
        }

        let joinable = rows.iter().all(|row| match row.get(column) {
            None => true,
            Some(Value::Array(items)) => items.iter().all(|v| v.is_string()),
            Some(_) => false,
        });

        if !joinable {
            diag.record(
                DiagnosticKind::ColumnDropped,
                format!("column `{}` mixes lists and non-lists", column),
            );
            for row in rows.iter_mut() {
                row.remove(column);
            }
            continue;
        }

        for row in rows.iter_mut() {
            if let Some(Value::Array(items)) = row.get(column) {
                let joined = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join("/");
                row.insert(column.clone(), Value::String(joined));
            }
        }
    }
}

/// Parse the known date columns into timestamps.
///
/// An absent column is created as all-missing first, so downstream
/// consumers always see it.
fn parse_date_columns(rows: &mut [NormalizedRow], diag: &mut Diagnostics) {
    for column in DATE_COLUMNS {
        for row in rows.iter_mut() {
            let cell = row.entry(column.to_string()).or_insert(Cell::Missing);
            if let Cell::Text(text) = cell {
                match parse_date(text) {
                    Some(ts) => *cell = Cell::Timestamp(ts),
                    None => {
                        diag.record(
                            DiagnosticKind::UnparsedDate,
                            format!("unparseable date `{}` in `{}`", text, column),
                        );
                        *cell = Cell::Missing;
                    }
                }
            }
        }
    }
}

/// Parse a date string.
///
/// Accepts RFC 3339 timestamps (`added_at`) and the release-date precisions
/// the API serves: `YYYY-MM-DD`, `YYYY-MM`, `YYYY`. Missing month/day
/// default to 1.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    let mut parts = text.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}
