//! Runtime configuration
//!
//! Everything has a default in [`crate::constants`]. A TOML file can override
//! any of it, and the session credentials can also come from the environment.

use crate::{
    constants::{
        COOLDOWN_EVERY, DEFAULT_CURRENCY, DEFAULT_LANGUAGE, DEFAULT_LEDGER_PATH,
        DEFAULT_NAMESPACES, DEFAULT_WANT_TO_SELL, INVENTORY_PAGE_SIZE, LONG_DELAY_MS,
        REQUEST_TIMEOUT_SECS, SHORT_DELAY_MS, STEAM_COMMUNITY_URL,
    },
    error::ConfigError,
    types::NamespaceSpec,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque Steam session credentials, passed to every component doing network I/O
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// `sessionid` cookie, also the anti-forgery token of sell requests
    pub session_id: String,
    /// `steamLoginSecure` cookie
    pub login_secure: String,
    /// SteamID64 of the inventory owner
    pub steam_id: String,
}

impl Credentials {
    pub fn new(
        session_id: impl Into<String>,
        login_secure: impl Into<String>,
        steam_id: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            login_secure: login_secure.into(),
            steam_id: steam_id.into(),
        }
    }

    /// Cookie header value for authenticated requests
    pub fn cookie_header(&self) -> String {
        format!(
            "sessionid={}; steamLoginSecure={}",
            self.session_id, self.login_secure
        )
    }

    /// Overrides fields from `STEAM_SESSION_ID`, `STEAM_LOGIN_SECURE` and `STEAM_ID`
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("STEAM_SESSION_ID") {
            self.session_id = value;
        }
        if let Ok(value) = std::env::var("STEAM_LOGIN_SECURE") {
            self.login_secure = value;
        }
        if let Ok(value) = std::env::var("STEAM_ID") {
            self.steam_id = value;
        }
    }

    /// Checks the cookies needed for inventory and sell requests are present
    pub fn require_session(&self) -> Result<(), ConfigError> {
        if self.session_id.is_empty() {
            return Err(ConfigError::MissingCredential("session_id"));
        }
        if self.login_secure.is_empty() {
            return Err(ConfigError::MissingCredential("login_secure"));
        }
        Ok(())
    }

    /// Checks the inventory owner is known
    pub fn require_owner(&self) -> Result<(), ConfigError> {
        if self.steam_id.is_empty() {
            return Err(ConfigError::MissingCredential("steam_id"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("session_id", &redact(&self.session_id))
            .field("login_secure", &redact(&self.login_secure))
            .field("steam_id", &self.steam_id)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

/// Request pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub short_delay_ms: u64,
    pub long_delay_ms: u64,
    pub cooldown_every: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            short_delay_ms: SHORT_DELAY_MS,
            long_delay_ms: LONG_DELAY_MS,
            cooldown_every: COOLDOWN_EVERY,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub ledger_path: PathBuf,
    pub community_url: String,
    pub currency: u32,
    pub language: String,
    pub inventory_page_size: u32,
    pub default_want_to_sell: bool,
    pub request_timeout_secs: u64,
    pub pacing: PacingConfig,
    pub namespaces: Vec<NamespaceSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            community_url: STEAM_COMMUNITY_URL.to_string(),
            currency: DEFAULT_CURRENCY,
            language: DEFAULT_LANGUAGE.to_string(),
            inventory_page_size: INVENTORY_PAGE_SIZE,
            default_want_to_sell: DEFAULT_WANT_TO_SELL,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            pacing: PacingConfig::default(),
            namespaces: default_namespaces(),
        }
    }
}

/// The stock list of scanned namespaces
pub fn default_namespaces() -> Vec<NamespaceSpec> {
    DEFAULT_NAMESPACES
        .iter()
        .map(|(app_id, context_id, name)| NamespaceSpec::new(*app_id, *context_id, *name))
        .collect()
}

impl AppConfig {
    /// Loads `path` if it exists, otherwise defaults; then applies env credentials
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.credentials.apply_env();
        Ok(config)
    }

    /// Parses a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Normalized base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.community_url.trim_end_matches('/')
    }
}
