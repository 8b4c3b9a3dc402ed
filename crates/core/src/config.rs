//! Application configuration.
//!
//! Settings live in `<config dir>/marquee/config.toml` and can be
//! overridden with `MARQUEE_*` environment variables. A commented default
//! file is written on first run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Datastore endpoint used when none is configured.
pub const DEFAULT_SERVER_URL: &str =
    "https://movie-alert-60047185658.development.catalystserverless.in/server/movie_alert/datastore";

/// Directory name under the user's config root.
pub const CONFIG_DIR: &str = "marquee";

/// Runtime configuration for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Preference datastore endpoint.
    pub server_url: String,
    /// HTTP source for the theatre catalog (JSON array of strings).
    pub catalog_url: Option<String>,
    /// Local file source for the theatre catalog. Takes precedence over
    /// `catalog_url` when both are set.
    pub catalog_path: Option<PathBuf>,
    /// Authenticator endpoint supplying the user's email.
    pub auth_url: Option<String>,
    /// Explicit user email, bypassing the authenticator.
    pub user_email: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            catalog_url: None,
            catalog_path: None,
            auth_url: None,
            user_email: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location plus environment
    /// overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load configuration from an explicit file path plus environment
    /// overrides. The file is optional; defaults fill the gaps.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("MARQUEE"))
            .build()
            .context("failed to build configuration")?;
        let config = settings
            .try_deserialize()
            .context("failed to parse configuration")?;
        Ok(config)
    }
}

/// Path of the configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write a commented default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(&config_path())
}

fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let template = format!(
        r#"# Marquee configuration.

# Preference datastore endpoint.
server_url = "{DEFAULT_SERVER_URL}"

# Theatre catalog source: a local JSON file or an HTTP endpoint serving
# a JSON array of display names. The file takes precedence.
# catalog_path = "/path/to/theatres.json"
# catalog_url = "https://example.com/theatres.json"

# Identity: either a fixed email or an authenticator endpoint.
# user_email = "you@example.com"
# auth_url = "https://example.com/auth/session"
"#
    );
    fs::write(path, template).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(&dir.path().join("absent.toml"))?;
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert!(config.catalog_path.is_none());
        assert!(config.user_email.is_none());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
server_url = "http://localhost:9000/datastore"
user_email = "user@example.com"
"#,
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.server_url, "http://localhost:9000/datastore");
        assert_eq!(config.user_email.as_deref(), Some("user@example.com"));
        Ok(())
    }

    #[test]
    fn default_file_is_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("marquee").join("config.toml");
        ensure_default_config_at(&path)?;
        assert!(path.exists());

        let contents = fs::read_to_string(&path)?;
        assert!(contents.contains("server_url"));

        // A second call leaves the existing file alone.
        fs::write(&path, "server_url = \"http://changed\"\n")?;
        ensure_default_config_at(&path)?;
        let contents = fs::read_to_string(&path)?;
        assert!(contents.contains("changed"));
        Ok(())
    }
}
