//! Unified dashboard interface.
//!
//! High-level entry point tying the auth session, the API client, the
//! normalizer and the view derivations together. Each call produces a fresh
//! immutable result; there is no shared mutable view state.

use crate::api::{AuthConfig, AuthSession, SpotifyApi};
use crate::charts::{self, ChartSpec};
use crate::columns::{classify_columns, ColumnViews};
use crate::diag::Diagnostics;
use crate::error::Result;
use crate::models::{Playlist, UserProfile};
use crate::normalize;
use crate::table::TrackTable;

/// Default playlist-listing page size.
const PLAYLIST_LIMIT: u32 = 50;

/// A normalized table together with everything the pipeline skipped.
#[derive(Debug)]
pub struct LoadOutcome {
    pub table: TrackTable,
    pub diagnostics: Diagnostics,
}

/// Main dashboard interface.
///
/// # Example
///
/// ```rust,no_run
/// use spotiviz::{AuthConfig, Dashboard};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AuthConfig::new("id", "secret", "http://localhost:8050");
///     let dashboard = Dashboard::sign_in(&config, "auth_code").await?;
///
///     let playlists = dashboard.playlists().await?;
///     let outcome = dashboard.load_tracks(&playlists).await?;
///     println!("{} track row(s)", outcome.table.len());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Dashboard {
    api: SpotifyApi,
}

impl Dashboard {
    /// Exchange an authorization code and build a ready-to-use dashboard.
    pub async fn sign_in(config: &AuthConfig, code: &str) -> Result<Self> {
        let session = AuthSession::exchange(config, code).await?;
        Ok(Self::from_session(&session))
    }

    /// Build a dashboard from an existing session.
    pub fn from_session(session: &AuthSession) -> Self {
        Self {
            api: SpotifyApi::from_session(session),
        }
    }

    /// Build a dashboard from a bare bearer token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            api: SpotifyApi::with_token(token),
        }
    }

    /// The underlying API client.
    pub fn api(&self) -> &SpotifyApi {
        &self.api
    }

    /// The signed-in user.
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.api.get_current_user().await
    }

    /// The user's playlists, as offered for selection.
    pub async fn playlists(&self) -> Result<Vec<Playlist>> {
        self.api.current_user_playlists(PLAYLIST_LIMIT).await
    }

    /// Load and normalize tracks for the selected playlists.
    ///
    /// An empty selection (or a missing token) produces an empty table.
    pub async fn load_tracks(&self, playlists: &[Playlist]) -> Result<LoadOutcome> {
        let mut diagnostics = Diagnostics::new();
        let table = normalize::load_tracks(&self.api, playlists, &mut diagnostics).await?;
        Ok(LoadOutcome { table, diagnostics })
    }

    /// Classify a table's columns for display and axis selection.
    pub fn classify_columns(&self, table: &TrackTable) -> ColumnViews {
        classify_columns(table)
    }

    /// Derive scatter traces for the selected axes.
    pub fn render_scatter(
        &self,
        table: &TrackTable,
        x: &str,
        y: &str,
        z: Option<&str>,
        color_by: Option<&str>,
        show_lines: bool,
    ) -> ChartSpec {
        charts::render_scatter(table, x, y, z, color_by, show_lines)
    }

    /// Derive polar traces over the selected dimensions.
    pub fn render_polar(
        &self,
        table: &TrackTable,
        dims: &[String],
        color_by: Option<&str>,
        range_min: f64,
        range_max: f64,
        show_lines: bool,
    ) -> ChartSpec {
        charts::render_polar(table, dims, color_by, range_min, range_max, show_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_yields_empty_outcome() {
        let dashboard = Dashboard::with_token("token");
        let outcome = tokio_test::block_on(dashboard.load_tracks(&[])).unwrap();
        assert!(outcome.table.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_classify_empty_table() {
        let dashboard = Dashboard::with_token("token");
        let views = dashboard.classify_columns(&TrackTable::default());
        assert!(views.all.is_empty());
    }
}
