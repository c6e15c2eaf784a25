//! API base address resolution.
//!
//! The base address is decided once, when the host starts, and handed to
//! `ConsoleClient::new`. Served builds talk to `/api` on their own origin;
//! development builds talk to a separate API host.

use std::fmt;
use std::str::FromStr;

/// Base path used when the console is served by the API itself.
pub const PRODUCTION_BASE_PATH: &str = "/api";

/// Default API address for development builds.
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable selecting the deployment mode.
pub const MODE_ENV_VAR: &str = "CONSOLE_ENV";

/// Environment variable overriding the development API address.
pub const API_URL_ENV_VAR: &str = "CONSOLE_API_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    Production,
    #[default]
    Development,
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(DeploymentMode::Production),
            "development" | "dev" => Ok(DeploymentMode::Development),
            other => Err(format!("unknown deployment mode: {other}")),
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Production => write!(f, "production"),
            DeploymentMode::Development => write!(f, "development"),
        }
    }
}

/// Resolved API location. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    mode: DeploymentMode,
    base_url: String,
}

impl ApiConfig {
    pub fn for_mode(mode: DeploymentMode) -> Self {
        let base_url = match mode {
            DeploymentMode::Production => PRODUCTION_BASE_PATH,
            DeploymentMode::Development => DEVELOPMENT_BASE_URL,
        };
        Self {
            mode,
            base_url: base_url.to_string(),
        }
    }

    /// Development mode pointed at an explicit host, e.g. a mock server on a
    /// random port.
    pub fn development(base_url: &str) -> Self {
        Self {
            mode: DeploymentMode::Development,
            base_url: base_url.to_string(),
        }
    }

    /// Read `CONSOLE_ENV` and `CONSOLE_API_URL`.
    pub fn from_env() -> Self {
        let mode = std::env::var(MODE_ENV_VAR).ok();
        let api_url = std::env::var(API_URL_ENV_VAR).ok();
        Self::from_vars(mode.as_deref(), api_url.as_deref())
    }

    /// Resolve from raw variable values. An unset or unparseable mode falls
    /// back to development.
    pub fn from_vars(mode: Option<&str>, api_url: Option<&str>) -> Self {
        let mode = mode
            .and_then(|raw| match raw.parse() {
                Ok(mode) => Some(mode),
                Err(err) => {
                    tracing::warn!("{err}, using development");
                    None
                }
            })
            .unwrap_or_default();
        Self::resolve(mode, api_url)
    }

    /// The override only applies to development; production is always
    /// same-origin.
    pub fn resolve(mode: DeploymentMode, api_url: Option<&str>) -> Self {
        match (mode, api_url.map(str::trim).filter(|url| !url.is_empty())) {
            (DeploymentMode::Development, Some(url)) => Self::development(url),
            _ => Self::for_mode(mode),
        }
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when request paths are origin-relative and the host has to
    /// supply the origin.
    pub fn is_same_origin(&self) -> bool {
        self.base_url.starts_with('/')
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::for_mode(DeploymentMode::default())
    }
}
