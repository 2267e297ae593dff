//! Playlist model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A playlist as offered for selection.
///
/// Fetched fresh per session from `/me/playlists`; never persisted. The
/// display name is carried through normalization as the `user_playlist` tag
/// on every track row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
    /// Spotify playlist ID.
    pub id: String,
    /// Human-readable playlist name.
    pub display_name: String,
}

impl Playlist {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Parse a playlist from a raw API item.
    ///
    /// Returns `None` when the item has no `id`.
    pub fn from_json(json: &Value) -> Option<Self> {
        let id = json.get("id").and_then(|v| v.as_str())?;
        let name = json.get("name").and_then(|v| v.as_str()).unwrap_or("");
        Some(Self::new(id, name))
    }
}
