//! # Spotiviz
//!
//! A Rust library for turning Spotify playlists into analyzable tables and
//! chart specifications.
//!
//! ## Quick Start
//!
//! The easiest way to use this library is through the [`Dashboard`] struct:
//!
//! ```rust,no_run
//! use spotiviz::{AuthConfig, Dashboard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Exchange the OAuth authorization code for a session
//!     let config = AuthConfig::new("client_id", "client_secret", "redirect_uri");
//!     let dashboard = Dashboard::sign_in(&config, "code_from_redirect").await?;
//!
//!     // Pick playlists and normalize their tracks into one table
//!     let playlists = dashboard.playlists().await?;
//!     let outcome = dashboard.load_tracks(&playlists).await?;
//!
//!     // Derive views over the table
//!     let views = dashboard.classify_columns(&outcome.table);
//!     let spec = dashboard.render_scatter(
//!         &outcome.table,
//!         "audio_feature.energy",
//!         "audio_feature.valence",
//!         None,
//!         Some("user_playlist"),
//!         false,
//!     );
//!     println!("{} columns, {} trace(s)", views.all.len(), spec.trace_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Normalization**: pages through playlist items, merges audio features
//!   by batch position, deduplicates, flattens nested JSON into a uniform
//!   [`TrackTable`] with dotted-path columns
//! - **Column views**: full/hidden/axis-candidate classification
//! - **Chart derivation**: grouped 2D/3D scatter and melted polar traces
//!
//! Failures degrade gracefully: a playlist that cannot be fetched is
//! skipped, unjoinable columns are dropped, and everything skipped is
//! reported through an explicit [`Diagnostics`] sink rather than an ambient
//! logger.
//!
//! ## Low-Level APIs
//!
//! - [`AuthSession`] - OAuth code exchange and authorize-URL generation
//! - [`SpotifyApi`] - Web API client (`/me`, playlists, items, features)
//! - [`normalize`], [`columns`], [`charts`] - the pipeline stages

pub mod api;
pub mod charts;
pub mod columns;
mod dashboard;
pub mod diag;
pub mod error;
pub mod models;
pub mod normalize;
pub mod table;

// Main interface (recommended)
pub use dashboard::{Dashboard, LoadOutcome};

// Low-level APIs
pub use api::{AuthConfig, AuthSession, SpotifyApi};
pub use charts::{ChartSpec, PolarTrace, ScatterTrace, TraceMode, GROUP_LABEL_LIMIT};
pub use columns::{classify_columns, AxisOption, ColumnDescriptor, ColumnViews};
pub use diag::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::SpotivizError;
pub use models::{Playlist, UserProfile};
pub use table::{Cell, TrackTable};
