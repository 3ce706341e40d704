//! Application-level configuration loading, including the API credentials and paging limits.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::credentials::CallerIdentity;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAME_OBJECT_ADMIN_CONFIG_PATH";
/// Environment variable adding one service credential on top of the file.
const SERVICE_TOKEN_ENV: &str = "ADMIN_SERVICE_TOKEN";
const DEFAULT_PAGE_SIZE: u64 = 25;
const MAX_PAGE_SIZE: u64 = 100;

/// Token and the identity it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialConfig {
    pub token: String,
    pub identity: CallerIdentity,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    credentials: Vec<CredentialConfig>,
    default_page_size: u64,
    max_page_size: u64,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        credentials = app_config.credentials.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        match env::var(SERVICE_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => config.with_service_token(token),
            _ => config,
        }
    }

    /// Parse the JSON document found at [`DEFAULT_CONFIG_PATH`].
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Register an extra unrestricted credential.
    pub fn with_service_token(mut self, token: impl Into<String>) -> Self {
        self.credentials.push(CredentialConfig {
            token: token.into(),
            identity: CallerIdentity::Service,
        });
        self
    }

    /// Register an extra credential scoped to one player.
    pub fn with_player_token(mut self, token: impl Into<String>, player_id: impl Into<String>) -> Self {
        self.credentials.push(CredentialConfig {
            token: token.into(),
            identity: CallerIdentity::Player {
                player_id: player_id.into(),
            },
        });
        self
    }

    pub fn credentials(&self) -> &[CredentialConfig] {
        &self.credentials
    }

    /// Page size applied when a listing request carries no `limit`.
    pub fn default_page_size(&self) -> u64 {
        self.default_page_size
    }

    /// Largest `limit` a listing request may ask for.
    pub fn max_page_size(&self) -> u64 {
        self.max_page_size
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credentials: Vec::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    credentials: Vec<RawCredential>,
    #[serde(default)]
    default_page_size: Option<u64>,
    #[serde(default)]
    max_page_size: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let credentials = value
            .credentials
            .into_iter()
            .filter_map(|raw| match CredentialConfig::try_from(raw) {
                Ok(credential) => Some(credential),
                Err(reason) => {
                    warn!(reason, "skipping credential entry");
                    None
                }
            })
            .collect();

        let max_page_size = value.max_page_size.unwrap_or(MAX_PAGE_SIZE).max(1);
        let default_page_size = value
            .default_page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, max_page_size);

        Self {
            credentials,
            default_page_size,
            max_page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawCredentialKind {
    Service,
    Player,
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single credential inside the configuration file.
struct RawCredential {
    token: String,
    kind: RawCredentialKind,
    #[serde(default)]
    player_id: Option<String>,
}

impl TryFrom<RawCredential> for CredentialConfig {
    type Error = &'static str;

    fn try_from(value: RawCredential) -> Result<Self, Self::Error> {
        let token = value.token.trim().to_owned();
        if token.is_empty() {
            return Err("credential token is blank");
        }

        let identity = match value.kind {
            RawCredentialKind::Service => CallerIdentity::Service,
            RawCredentialKind::Player => {
                let player_id = value
                    .player_id
                    .map(|id| id.trim().to_owned())
                    .filter(|id| !id.is_empty())
                    .ok_or("player credential without `player_id`")?;
                CallerIdentity::Player { player_id }
            }
        };

        Ok(Self { token, identity })
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_credentials_and_skips_incomplete_players() {
        let config = AppConfig::from_json(
            r#"{
                "credentials": [
                    { "token": "svc", "kind": "service" },
                    { "token": "p1-token", "kind": "player", "player_id": "p1" },
                    { "token": "orphan", "kind": "player" }
                ],
                "default_page_size": 10
            }"#,
        )
        .unwrap();

        assert_eq!(config.credentials().len(), 2);
        assert_eq!(
            config.credentials()[1].identity,
            CallerIdentity::Player {
                player_id: "p1".into()
            }
        );
        assert_eq!(config.default_page_size(), 10);
        assert_eq!(config.max_page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn default_page_size_never_exceeds_the_maximum() {
        let config =
            AppConfig::from_json(r#"{ "default_page_size": 500, "max_page_size": 50 }"#).unwrap();
        assert_eq!(config.default_page_size(), 50);
    }
}
