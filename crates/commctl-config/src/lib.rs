//! Session configuration resolution for commctl.
//!
//! Merges configuration from four sources into one immutable
//! [`SessionConfig`] per invocation. Precedence, highest wins:
//!
//! 1. Explicit CLI flags ([`FlagOverrides`])
//! 2. Environment variables (`COMMCTL_*`, captured in an [`EnvSnapshot`])
//! 3. The user config file (default `~/.commissaire.json`)
//! 4. Built-in defaults
//!
//! Each source is fully read and merged key-by-key before the next
//! higher-precedence source is applied. There is no ambient environment
//! lookup inside the resolver; callers hand it a snapshot, which keeps
//! precedence independently testable.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default server URL when no source provides one.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Config file name under the user's home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".commissaire.json";

/// Environment variable names recognized by the resolver.
pub const ENV_SERVER: &str = "COMMCTL_SERVER";
/// Username override.
pub const ENV_USERNAME: &str = "COMMCTL_USERNAME";
/// Password override.
pub const ENV_PASSWORD: &str = "COMMCTL_PASSWORD";
/// Bearer token override.
pub const ENV_TOKEN: &str = "COMMCTL_TOKEN";
/// TLS verification override (`true`/`false`/`1`/`0`).
pub const ENV_TLS_VERIFY: &str = "COMMCTL_TLS_VERIFY";
/// Timeout override in seconds.
pub const ENV_TIMEOUT: &str = "COMMCTL_TIMEOUT";

/// Errors raised while resolving a session configuration.
///
/// All of these are terminal: the invocation stops and the error is
/// surfaced to the user without retry.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source exists but could not be parsed.
    #[error("malformed configuration: {reason}")]
    MalformedFile {
        /// What failed to parse and why.
        reason: String,
    },

    /// The resolved authentication settings are inconsistent.
    #[error("invalid authentication configuration: {reason}")]
    InvalidAuth {
        /// Why the auth settings were rejected.
        reason: String,
    },

    /// The resolved server URL is not an absolute http(s) URL.
    #[error("invalid server URL {url:?}: {reason}")]
    InvalidUrl {
        /// The offending URL value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The resolved timeout is not a positive number of seconds.
    #[error("invalid timeout: must be a positive number of seconds")]
    InvalidTimeout,
}

/// Active authentication mode for one invocation.
///
/// Exactly one mode is active; [`resolve`] rejects configurations where
/// both username/password and a token are present.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// No credentials. Only valid when the invoked command does not
    /// require authentication.
    None,
    /// HTTP basic authentication.
    Basic {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
    /// Bearer token authentication.
    Token(String),
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never expose credentials in debug output
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Token(_) => write!(f, "Token([REDACTED])"),
        }
    }
}

/// Immutable connection parameters for one CLI invocation.
///
/// Created once by [`resolve`] and passed by reference through the call
/// chain; never mutated afterwards.
#[derive(Clone)]
pub struct SessionConfig {
    server_url: String,
    auth: AuthMode,
    tls_verify: bool,
    timeout_secs: u64,
}

impl SessionConfig {
    /// Builds a config directly, validating the server URL.
    ///
    /// Most callers go through [`resolve`]; this constructor exists for
    /// components that assemble a config programmatically (and for tests).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] or [`ConfigError::InvalidTimeout`].
    pub fn new(
        server_url: &str,
        auth: AuthMode,
        tls_verify: bool,
        timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        let server_url = validate_server_url(server_url)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(Self {
            server_url,
            auth,
            tls_verify,
            timeout_secs,
        })
    }

    /// The server base URL, without a trailing slash.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// The active authentication mode.
    #[must_use]
    pub fn auth(&self) -> &AuthMode {
        &self.auth
    }

    /// Whether TLS certificates are verified.
    #[must_use]
    pub const fn tls_verify(&self) -> bool {
        self.tls_verify
    }

    /// Request timeout, applied as both connect and total timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("server_url", &self.server_url)
            .field("auth", &self.auth)
            .field("tls_verify", &self.tls_verify)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// A captured view of the process environment.
///
/// [`resolve`] never reads `std::env` itself; the caller captures the
/// environment once and hands it in, so tests can inject arbitrary maps.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot(HashMap<String, String>);

impl EnvSnapshot {
    /// Captures the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self(std::env::vars().collect())
    }

    /// Builds a snapshot from explicit pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Explicit CLI flag overrides, the highest-precedence source.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    /// `--server`.
    pub server: Option<String>,
    /// `--username`.
    pub username: Option<String>,
    /// `--password`.
    pub password: Option<String>,
    /// `--token`.
    pub token: Option<String>,
    /// `--tls-verify`.
    pub tls_verify: Option<bool>,
    /// `--timeout` in seconds.
    pub timeout: Option<u64>,
}

/// One configuration source, with every key optional.
///
/// Doubles as the serde shape of the config file; unknown keys are
/// ignored for forward compatibility.
#[derive(Debug, Clone, Default, Deserialize)]
struct Layer {
    server: Option<String>,
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
    tls_verify: Option<bool>,
    timeout: Option<u64>,
}

impl Layer {
    /// Overlays `higher` onto `self`, key by key.
    fn apply(&mut self, higher: Layer) {
        if higher.server.is_some() {
            self.server = higher.server;
        }
        if higher.username.is_some() {
            self.username = higher.username;
        }
        if higher.password.is_some() {
            self.password = higher.password;
        }
        if higher.token.is_some() {
            self.token = higher.token;
        }
        if higher.tls_verify.is_some() {
            self.tls_verify = higher.tls_verify;
        }
        if higher.timeout.is_some() {
            self.timeout = higher.timeout;
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not present, skipping");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::MalformedFile {
            reason: format!("could not read {}: {e}", path.display()),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::MalformedFile {
            reason: format!("could not parse {}: {e}", path.display()),
        })
    }

    fn from_env(env: &EnvSnapshot) -> Result<Self, ConfigError> {
        let tls_verify = env.get(ENV_TLS_VERIFY).map(parse_bool).transpose()?;
        let timeout = env
            .get(ENV_TIMEOUT)
            .map(|raw| {
                raw.parse::<u64>().map_err(|_| ConfigError::MalformedFile {
                    reason: format!("{ENV_TIMEOUT} must be an integer, got {raw:?}"),
                })
            })
            .transpose()?;
        Ok(Self {
            server: env.get(ENV_SERVER).map(str::to_owned),
            username: env.get(ENV_USERNAME).map(str::to_owned),
            password: env.get(ENV_PASSWORD).map(str::to_owned),
            token: env.get(ENV_TOKEN).map(str::to_owned),
            tls_verify,
            timeout,
        })
    }

    fn from_flags(flags: &FlagOverrides) -> Self {
        Self {
            server: flags.server.clone(),
            username: flags.username.clone(),
            password: flags.password.clone(),
            token: flags.token.clone(),
            tls_verify: flags.tls_verify,
            timeout: flags.timeout,
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, ConfigError> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::MalformedFile {
            reason: format!("{ENV_TLS_VERIFY} must be true or false, got {raw:?}"),
        }),
    }
}

fn validate_server_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme {other:?}, expected http or https"),
            });
        }
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn resolve_auth(layer: &Layer, requires_auth: bool) -> Result<AuthMode, ConfigError> {
    let has_token = layer.token.is_some();
    let has_user = layer.username.is_some();
    let has_pass = layer.password.is_some();

    if has_token && (has_user || has_pass) {
        return Err(ConfigError::InvalidAuth {
            reason: "both username/password and token are set; pick one".to_string(),
        });
    }
    if let Some(token) = &layer.token {
        return Ok(AuthMode::Token(token.clone()));
    }
    match (&layer.username, &layer.password) {
        (Some(username), Some(password)) => Ok(AuthMode::Basic {
            username: username.clone(),
            password: password.clone(),
        }),
        (Some(_), None) => Err(ConfigError::InvalidAuth {
            reason: "username is set but password is missing".to_string(),
        }),
        (None, Some(_)) => Err(ConfigError::InvalidAuth {
            reason: "password is set but username is missing".to_string(),
        }),
        (None, None) if requires_auth => Err(ConfigError::InvalidAuth {
            reason: "no credentials configured; set username/password or a token".to_string(),
        }),
        (None, None) => Ok(AuthMode::None),
    }
}

/// Path of the config file to read: the explicit override, or
/// `~/.commissaire.json` when the home directory is known.
fn config_file_path(file_override: Option<&Path>) -> Option<PathBuf> {
    file_override.map_or_else(
        || dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE)),
        |p| Some(p.to_path_buf()),
    )
}

/// Resolves a [`SessionConfig`] from all configuration sources.
///
/// `requires_auth` tells the resolver whether the invoked command needs
/// credentials; commands that never touch the network (passhash
/// generation) pass `false` and tolerate a credential-free environment.
///
/// A missing config file is not an error; a present-but-unparsable one is.
///
/// # Errors
///
/// See [`ConfigError`] for the failure taxonomy.
pub fn resolve(
    file_override: Option<&Path>,
    env: &EnvSnapshot,
    flags: &FlagOverrides,
    requires_auth: bool,
) -> Result<SessionConfig, ConfigError> {
    let mut merged = Layer::default();

    if let Some(path) = config_file_path(file_override) {
        merged.apply(Layer::from_file(&path)?);
    }
    merged.apply(Layer::from_env(env)?);
    merged.apply(Layer::from_flags(flags));

    let server_url = validate_server_url(
        merged
            .server
            .as_deref()
            .unwrap_or(DEFAULT_SERVER_URL),
    )?;
    let auth = resolve_auth(&merged, requires_auth)?;
    let timeout_secs = merged.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::InvalidTimeout);
    }

    let config = SessionConfig {
        server_url,
        auth,
        tls_verify: merged.tls_verify.unwrap_or(true),
        timeout_secs,
    };
    debug!(server = %config.server_url, tls_verify = config.tls_verify, "resolved session config");
    Ok(config)
}
