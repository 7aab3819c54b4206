//! Credential and endpoint configuration.
//!
//! Values resolve from, in order of precedence:
//!
//! 1. Command-line flags (`--tenant-id`, `--client-id`, `--client-secret`)
//! 2. Process environment (`TENANT_ID`, `CLIENT_ID`, `CLIENT_SECRET`)
//! 3. `.env.local`, then `.env` in the working directory (or `--env-file`)
//!
//! Dotenv files never override variables that are already set.

use std::env;
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub const TENANT_ID_VAR: &str = "TENANT_ID";
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";

pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "{0} must be set. Provide it via:\n\
         - Command-line flag\n\
         - Environment variable: export {0}=...\n\
         - A .env or .env.local file in the working directory"
    )]
    MissingCredential(&'static str),

    #[error("Environment file not found: {0}")]
    EnvFileNotFound(String),

    #[error("Failed to load environment file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },

    #[error(
        "Audit window must cover at least one day and start within the supported date range (got {0} days)"
    )]
    InvalidWindow(u32),
}

/// Application (client-credentials) registration used to obtain a token.
#[derive(Clone)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from flags, falling back to the environment
    pub fn from_options(
        tenant_id: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            tenant_id: resolve(tenant_id, TENANT_ID_VAR)?,
            client_id: resolve(client_id, CLIENT_ID_VAR)?,
            client_secret: resolve(client_secret, CLIENT_SECRET_VAR)?,
        })
    }
}

fn resolve(flag: Option<&str>, var: &'static str) -> Result<String, ConfigError> {
    flag.map(str::to_string)
        .or_else(|| env::var(var).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingCredential(var))
}

/// Load dotenv files into the process environment.
///
/// An explicit `env_file` must exist. Without one, `.env.local` and `.env`
/// are loaded when present and silently skipped otherwise.
pub fn load_env_files(env_file: Option<&str>) -> Result<(), ConfigError> {
    if let Some(path) = env_file {
        if !Path::new(path).exists() {
            return Err(ConfigError::EnvFileNotFound(path.to_string()));
        }
        dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
            path: path.to_string(),
            source,
        })?;
        tracing::debug!(path, "loaded environment file");
        return Ok(());
    }

    for candidate in [".env.local", ".env"] {
        if Path::new(candidate).exists() {
            dotenvy::from_path(candidate).map_err(|source| ConfigError::EnvFile {
                path: candidate.to_string(),
                source,
            })?;
            tracing::debug!(path = candidate, "loaded environment file");
        }
    }

    Ok(())
}

/// Remote endpoints and per-request timeout
#[derive(Debug, Clone)]
pub struct GraphEndpoints {
    pub authority_url: String,
    pub graph_url: String,
    pub timeout_secs: u64,
}

impl Default for GraphEndpoints {
    fn default() -> Self {
        Self {
            authority_url: DEFAULT_AUTHORITY_URL.to_string(),
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GraphEndpoints {
    pub fn from_options(
        authority_url: Option<&str>,
        graph_url: Option<&str>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            authority_url: authority_url
                .unwrap_or(DEFAULT_AUTHORITY_URL)
                .trim_end_matches('/')
                .to_string(),
            graph_url: graph_url
                .unwrap_or(DEFAULT_GRAPH_URL)
                .trim_end_matches('/')
                .to_string(),
            timeout_secs,
        }
    }
}
