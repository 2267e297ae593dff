//! Authorization-code session for the Spotify Web API.
//!
//! Implements the code-for-token exchange against accounts.spotify.com.
//! The redirect handling that produces the authorization code lives in the
//! UI layer; this module only consumes the code.

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{error, info};

use crate::error::{Result, SpotivizError};

/// Token endpoint.
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Authorization endpoint.
const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";

/// OAuth scopes required by the dashboard.
pub const SCOPE: &str = "user-library-read playlist-read-private";

/// OAuth application credentials.
///
/// Matches the Spotify developer-dashboard settings; typically loaded from
/// `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` / `SPOTIFY_REDIRECT_URI`.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl AuthConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// An authenticated session holding a bearer token.
///
/// # Example
///
/// ```rust,no_run
/// use spotiviz::{AuthConfig, AuthSession};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AuthConfig::new("id", "secret", "http://localhost:8050");
///     let session = AuthSession::exchange(&config, "auth_code_from_redirect").await?;
///     println!("token: {}", session.token());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    access_token: String,
    refresh_token: Option<String>,
    /// Token lifetime in seconds as reported by the token endpoint.
    expires_in: u64,
}

impl AuthSession {
    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `BadCredentials` if the token endpoint rejects the code or
    /// the client credentials.
    pub async fn exchange(config: &AuthConfig, code: &str) -> Result<Self> {
        let client = Client::new();
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &config.redirect_uri),
        ];

        let response = client
            .post(TOKEN_URL)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if let Some(err) = body.get("error") {
            let description = body
                .get("error_description")
                .and_then(|d| d.as_str())
                .unwrap_or("no description");
            error!("Token exchange failed (status {}): {}", status, err);
            return Err(SpotivizError::BadCredentials(format!(
                "{}: {}",
                err, description
            )));
        }

        let access_token = body
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                SpotivizError::BadCredentials("token endpoint returned no access_token".to_string())
            })?
            .to_string();

        let refresh_token = body
            .get("refresh_token")
            .and_then(|t| t.as_str())
            .map(|s| s.to_string());

        let expires_in = body.get("expires_in").and_then(|e| e.as_u64()).unwrap_or(0);

        info!(
            "Authenticated. Token lifetime: {}s, has refresh token: {}",
            expires_in,
            refresh_token.is_some()
        );

        Ok(Self {
            access_token,
            refresh_token,
            expires_in,
        })
    }

    /// Build the URL the user visits to authorize the application.
    pub fn authorize_url(config: &AuthConfig) -> String {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("response_type", "code"),
                ("client_id", config.client_id.as_str()),
                ("scope", SCOPE),
                ("redirect_uri", config.redirect_uri.as_str()),
            ],
        )
        .expect("authorize endpoint is a valid base URL");
        url.to_string()
    }

    /// The bearer access token.
    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// The refresh token, when the token endpoint issued one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Token lifetime in seconds.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url() {
        let config = AuthConfig::new("abc123", "secret", "http://localhost:8050/");
        let url = AuthSession::authorize_url(&config);
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=abc123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8050%2F"));
    }

    #[test]
    fn test_scope_encoding() {
        let config = AuthConfig::new("id", "secret", "uri");
        let url = AuthSession::authorize_url(&config);
        assert!(url.contains("scope=user-library-read+playlist-read-private"));
    }
}
