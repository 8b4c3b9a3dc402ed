//! User identity resolution.
//!
//! The datastore keys every record on the user's email. The email is
//! resolved once at startup, either straight from configuration or from
//! an external authenticator endpoint, and passed read-only to whichever
//! handlers need it afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::config::AppConfig;

/// Read-only session identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    email: String,
}

impl Identity {
    /// Wrap an already-known email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    /// The user's email address.
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Authenticator response shape: `{ "content": { "email_id": ... } }`.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    content: AuthContent,
}

#[derive(Debug, Deserialize)]
struct AuthContent {
    email_id: String,
}

/// Resolve the current user's identity from configuration or the
/// configured authenticator endpoint.
pub async fn resolve(config: &AppConfig) -> Result<Identity> {
    if let Some(email) = config
        .user_email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
    {
        info!(email = %email, "Using configured identity");
        return Ok(Identity::new(email));
    }

    let url = config
        .auth_url
        .as_deref()
        .context("no identity source configured: set user_email or auth_url")?;

    let response: AuthResponse = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to reach authenticator at {url}"))?
        .error_for_status()
        .context("authenticator rejected the session; sign in again")?
        .json()
        .await
        .context("failed to parse authenticator response")?;

    info!(email = %response.content.email_id, "Authenticated");
    Ok(Identity::new(response.content.email_id))
}
