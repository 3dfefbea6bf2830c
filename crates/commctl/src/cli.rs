//! Command-line argument parsing with clap.
//!
//! The subcommand tree is the tagged command variant the router matches
//! on exhaustively; connection flags mirror the `COMMCTL_*` environment
//! variables and config-file keys handled by `commctl-config`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use commctl_config::FlagOverrides;
use commctl_passhash::DEFAULT_COST;

/// Commissaire cluster-management client.
#[derive(Parser, Debug, Clone)]
#[command(name = "commctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (default ~/.commissaire.json).
    #[arg(long, env = "COMMCTL_CONFIG", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Server URL, e.g. https://commissaire.example.com:8080.
    #[arg(long, value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Username for basic authentication.
    #[arg(long, value_name = "NAME", global = true)]
    pub username: Option<String>,

    /// Password for basic authentication.
    #[arg(long, value_name = "PASSWORD", global = true)]
    pub password: Option<String>,

    /// Bearer token, instead of username/password.
    #[arg(long, value_name = "TOKEN", global = true)]
    pub token: Option<String>,

    /// Whether to verify the server's TLS certificate.
    #[arg(long, value_name = "BOOL", global = true)]
    pub tls_verify: Option<bool>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json, global = true)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Connection flag overrides for the configuration resolver.
    #[must_use]
    pub fn flag_overrides(&self) -> FlagOverrides {
        FlagOverrides {
            server: self.server.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
            tls_verify: self.tls_verify,
            timeout: self.timeout,
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// One JSON document per invocation, for scripting.
    #[default]
    Json,
    /// Human-readable table format.
    Table,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Host management commands.
    Hosts {
        /// Host subcommand to execute.
        #[command(subcommand)]
        command: HostCommands,
    },

    /// Cluster management commands.
    Clusters {
        /// Cluster subcommand to execute.
        #[command(subcommand)]
        command: ClusterCommands,
    },

    /// Local helpers that create artifacts for the service.
    Create {
        /// Artifact to create.
        #[command(subcommand)]
        command: CreateCommands,
    },
}

impl Commands {
    /// Whether the command talks to the service and therefore needs
    /// credentials. Passhash generation is purely local.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        !matches!(self, Self::Create { .. })
    }
}

/// Host subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum HostCommands {
    /// List all hosts, or the hosts of one cluster.
    List {
        /// Cluster name (omit to list every host).
        cluster: Option<String>,
    },

    /// Show one host.
    Get {
        /// Host IP address or name.
        address: String,
    },

    /// Register a host from a JSON spec file.
    Create {
        /// Spec file with address, ssh_priv_key and optional cluster.
        spec_file: PathBuf,
    },

    /// Remove a host from the service.
    Delete {
        /// Host IP address or name.
        address: String,
    },
}

/// Cluster subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ClusterCommands {
    /// List all cluster names.
    List,

    /// Show one cluster.
    Get {
        /// Cluster name.
        name: String,
    },

    /// Create a cluster from a JSON spec file.
    Create {
        /// Spec file with name and optional type/network.
        spec_file: PathBuf,
    },

    /// Delete a cluster. Its hosts are disassociated, not removed.
    Delete {
        /// Cluster name.
        name: String,
    },
}

/// Create subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum CreateCommands {
    /// Hash a password for the service's administrator user store.
    Passhash(PasshashArgs),
}

/// Arguments for the passhash command.
#[derive(Parser, Debug, Clone)]
pub struct PasshashArgs {
    /// Password to hash.
    pub plaintext: Option<String>,

    /// Password file to hash ("-" for stdin).
    #[arg(short, long, value_name = "PATH", conflicts_with = "plaintext")]
    pub file: Option<PathBuf>,

    /// bcrypt work factor.
    #[arg(short, long, default_value_t = DEFAULT_COST)]
    pub rounds: u32,
}
