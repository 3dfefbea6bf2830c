//! Command executors.
//!
//! Every executor follows the same contract: validate arguments locally,
//! make at most one API call, render one complete document to the
//! writer. Validation failures never reach the network.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::CliError;

pub mod clusters;
pub mod hosts;
pub mod passhash;

pub use clusters::ClustersCommand;
pub use hosts::HostsCommand;
pub use passhash::PasshashCommand;

/// Regex for valid cluster names (alphanumeric, hyphens, underscores).
static CLUSTER_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$").unwrap_or_else(|_| unreachable!()));

/// Regex for valid host addresses (IPv4/IPv6 literals or names).
static HOST_ADDRESS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9.:_-]*$").unwrap_or_else(|_| unreachable!()));

/// Validates a cluster name before it is spliced into a request path.
///
/// # Errors
///
/// Returns [`CliError::InvalidArgument`] if the name is empty or
/// contains characters outside the allowed set.
pub fn validate_cluster_name(name: &str) -> Result<(), CliError> {
    if CLUSTER_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "cluster name '{name}' must start with an alphanumeric and contain only \
             alphanumerics, '-' and '_'"
        )))
    }
}

/// Validates a host address before it is spliced into a request path.
///
/// # Errors
///
/// Returns [`CliError::InvalidArgument`] if the address is empty or
/// contains characters outside the allowed set.
pub fn validate_host_address(address: &str) -> Result<(), CliError> {
    if HOST_ADDRESS_REGEX.is_match(address) {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "host address '{address}' must start with an alphanumeric and contain only \
             alphanumerics, '.', ':', '-' and '_'"
        )))
    }
}

/// Reads and deserializes a JSON spec file supplied by the user.
///
/// # Errors
///
/// Returns [`CliError::InvalidArgument`] if the file cannot be read or
/// is not valid JSON for the expected schema.
pub fn read_spec<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        CliError::InvalidArgument(format!("cannot read spec file {}: {e}", path.display()))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        CliError::InvalidArgument(format!("malformed spec file {}: {e}", path.display()))
    })
}
