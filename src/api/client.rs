//! Web API client for authenticated Spotify operations.
//!
//! Thin wrapper over api.spotify.com/v1 returning raw `serde_json::Value`
//! payloads; the normalization pipeline owns all reshaping.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use crate::api::AuthSession;
use crate::error::{Result, SpotivizError};
use crate::models::{Playlist, UserProfile};

/// Base URL for the Spotify Web API.
const API_BASE_URL: &str = "https://api.spotify.com/v1/";

/// One page of playlist items.
#[derive(Debug, Clone)]
pub struct ItemsPage {
    /// Total item count reported by the server, when present.
    pub total: Option<u64>,
    /// Raw playlist-track items in page order.
    pub items: Vec<Value>,
}

/// Spotify Web API client.
///
/// Constructed either unauthenticated (every remote call fails with
/// `AuthMissing`; the pipeline maps that to an empty table) or with a
/// bearer token from an [`AuthSession`].
///
/// # Example
///
/// ```rust,no_run
/// use spotiviz::SpotifyApi;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let api = SpotifyApi::with_token("bearer_token");
///     let playlists = api.current_user_playlists(50).await?;
///     println!("{} playlists", playlists.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SpotifyApi {
    client: Client,
    token: Option<String>,
}

impl Default for SpotifyApi {
    fn default() -> Self {
        Self::new()
    }
}

impl SpotifyApi {
    /// Create an unauthenticated client.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            token: None,
        }
    }

    /// Create a client with an existing bearer token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: Some(token.into()),
        }
    }

    /// Create a client from a completed authorization session.
    pub fn from_session(session: &AuthSession) -> Self {
        Self::with_token(session.token())
    }

    /// Whether a bearer token is attached.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Make a GET request to the Web API.
    async fn get_api(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| SpotivizError::AuthMissing("no access token".to_string()))?;

        let url = format!("{}{}", API_BASE_URL, endpoint);
        debug!("GET {} with params: {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;
        let data: Value = response.json().await?;

        if let Some(err) = data.get("error") {
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            let status = err.get("status").and_then(|s| s.as_u64()).unwrap_or(0);
            error!("Spotify API error {} on {}: {}", status, endpoint, message);
            if status == 401 {
                return Err(SpotivizError::AuthMissing(message.to_string()));
            }
            return Err(SpotivizError::ApiError(message.to_string()));
        }

        Ok(data)
    }

    /// Get the signed-in user's profile.
    pub async fn get_current_user(&self) -> Result<UserProfile> {
        let json = self.get_api("me", &[]).await?;
        UserProfile::from_json(&json)
            .ok_or_else(|| SpotivizError::NoDataApi("no user profile".to_string()))
    }

    /// List the signed-in user's playlists.
    pub async fn current_user_playlists(&self, limit: u32) -> Result<Vec<Playlist>> {
        let json = self
            .get_api("me/playlists", &[("limit", limit.to_string())])
            .await?;

        let items = json
            .get("items")
            .and_then(|i| i.as_array())
            .ok_or_else(|| SpotivizError::NoDataApi("no playlist items".to_string()))?;

        Ok(items.iter().filter_map(Playlist::from_json).collect())
    }

    /// Get one page of a playlist's items.
    ///
    /// `total` in the result is the server-reported item count across all
    /// pages, used to drive the offset loop.
    pub async fn playlist_items(
        &self,
        playlist_id: &str,
        offset: u64,
        limit: u32,
    ) -> Result<ItemsPage> {
        let json = self
            .get_api(
                &format!("playlists/{}/tracks", playlist_id),
                &[
                    ("offset", offset.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let total = json.get("total").and_then(|t| t.as_u64());
        let items = json
            .get("items")
            .and_then(|i| i.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(ItemsPage { total, items })
    }

    /// Get audio features for a batch of track URIs.
    ///
    /// The endpoint accepts track IDs; URIs like `spotify:track:ID` are
    /// reduced to their ID. The response array preserves request order and
    /// may contain nulls for tracks without features; both are passed
    /// through unchanged so positional pairing with the request batch holds.
    pub async fn audio_features(&self, track_uris: &[String]) -> Result<Vec<Value>> {
        if track_uris.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = track_uris.iter().map(|u| uri_to_id(u)).collect();
        let json = self
            .get_api("audio-features", &[("ids", ids.join(","))])
            .await?;

        let features = json
            .get("audio_features")
            .and_then(|f| f.as_array())
            .cloned()
            .ok_or_else(|| SpotivizError::NoDataApi("no audio_features array".to_string()))?;

        Ok(features)
    }
}

/// Reduce a `spotify:track:ID` URI (or a plain ID) to the track ID.
fn uri_to_id(uri: &str) -> &str {
    uri.rsplit(':').next().unwrap_or(uri)
}
