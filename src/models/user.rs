//! Current-user model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The signed-in user, from `/me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Spotify user ID.
    pub id: String,
    /// Display name shown in the dashboard greeting.
    pub display_name: String,
}

impl UserProfile {
    /// Parse a user profile from a raw API response.
    pub fn from_json(json: &Value) -> Option<Self> {
        let id = json.get("id").and_then(|v| v.as_str())?;
        let display_name = json
            .get("display_name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        Some(Self {
            id: id.to_string(),
            display_name,
        })
    }
}
