//! CLI error types and process exit-code mapping.

use thiserror::Error;

use commctl_client::ApiError;
use commctl_config::ConfigError;
use commctl_passhash::HashError;

/// CLI-specific errors.
///
/// A command either fully succeeds and renders output, or fully fails
/// with one of these and renders nothing but a diagnostic.
#[derive(Debug, Error)]
pub enum CliError {
    /// A command argument was rejected before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration resolution failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential hashing failed.
    #[error("passhash error: {0}")]
    Hash(#[from] HashError),

    /// The API call failed after the client's internal retries.
    #[error("{0}")]
    Upstream(#[from] ApiError),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The process received a termination signal mid-command.
    #[error("interrupted")]
    Interrupted,
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// `1` for caller-side problems (validation, configuration, 4xx),
    /// `2` when the service failed or could not be reached, `130` when
    /// interrupted.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Interrupted => 130,
            Self::Upstream(ApiError::Server { .. } | ApiError::Unreachable { .. }) => 2,
            _ => 1,
        }
    }
}
