//! # commctl
//!
//! Command-line client for the Commissaire cluster-orchestration
//! service.
//!
//! Provides commands for:
//! - Listing and inspecting hosts
//! - Listing, inspecting and creating clusters
//! - Registering hosts from JSON spec files
//! - Generating bcrypt passhashes for the administrator user store
//!
//! # Architecture
//!
//! Connection settings are resolved by `commctl-config` from four layers
//! (defaults, `~/.commissaire.json`, `COMMCTL_*` variables, flags), then
//! handed to the `commctl-client` REST client. Each invocation validates
//! its arguments locally, makes at most one API call, and renders a
//! single JSON or table document.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, ClusterCommands, Commands, CreateCommands, Format, HostCommands};
pub use error::CliError;
pub use output::OutputFormat;
