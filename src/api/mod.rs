//! Spotify Web API clients.

pub mod auth;
pub mod client;

pub use auth::{AuthConfig, AuthSession};
pub use client::{ItemsPage, SpotifyApi};
