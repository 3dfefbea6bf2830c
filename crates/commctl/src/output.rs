//! Output formatting for CLI commands.
//!
//! Supports JSON (default, one document per invocation with stable field
//! order) and table (human-readable) output. Commands render through
//! [`render`], which buffers the whole document before writing so an
//! error can never leave partial output behind.

use std::io::Write;

use serde::Serialize;

use commctl_client::{Cluster, Host};

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both JSON and table output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut buf, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(buf)?;
            }
            Format::Table => {
                value.write_table(&mut buf)?;
            }
        }
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Json)
    }
}

/// Renders a value fully, then writes it in one shot.
///
/// # Errors
///
/// Returns an error if serialization or the final write fails; nothing
/// is written in the serialization-failure case.
pub fn render<W, T>(writer: &mut W, format: &OutputFormat, value: &T) -> Result<(), CliError>
where
    W: Write,
    T: Serialize + TableDisplay,
{
    let rendered = format.to_string(value)?;
    writer.write_all(rendered.as_bytes())?;
    Ok(())
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// All hosts known to the service. Serializes as a bare JSON array.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct HostList {
    /// Hosts in listing order.
    pub hosts: Vec<Host>,
}

impl TableDisplay for HostList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.hosts.is_empty() {
            writeln!(writer, "No hosts")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<40}  {:<14}  {:<24}",
            "ADDRESS", "STATUS", "CLUSTER"
        )?;
        writeln!(writer, "{}", "─".repeat(82))?;
        for host in &self.hosts {
            writeln!(
                writer,
                "{:<40}  {:<14}  {:<24}",
                host.address,
                status_label(host),
                host.cluster.as_deref().unwrap_or("-")
            )?;
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {} host(s)", self.hosts.len())?;
        Ok(())
    }
}

fn status_label(host: &Host) -> String {
    // snake_case, same spelling as the JSON output
    serde_json::to_string(&host.status)
        .unwrap_or_else(|_| String::new())
        .trim_matches('"')
        .to_string()
}

/// Host addresses scoped to one cluster. Serializes as a bare JSON
/// array.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AddressList {
    /// Host addresses in listing order.
    pub addresses: Vec<String>,
}

impl TableDisplay for AddressList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.addresses.is_empty() {
            writeln!(writer, "No hosts")?;
            return Ok(());
        }
        // One scalar per line so the output can feed another command
        for address in &self.addresses {
            writeln!(writer, "{address}")?;
        }
        Ok(())
    }
}

/// Cluster names known to the service. Serializes as a bare JSON array.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ClusterNameList {
    /// Cluster names in listing order.
    pub clusters: Vec<String>,
}

impl TableDisplay for ClusterNameList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.clusters.is_empty() {
            writeln!(writer, "No clusters")?;
            return Ok(());
        }
        for name in &self.clusters {
            writeln!(writer, "{name}")?;
        }
        Ok(())
    }
}

impl TableDisplay for Host {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Host: {}", self.address)?;
        writeln!(writer, "  Status:   {}", status_label(self))?;
        writeln!(
            writer,
            "  Cluster:  {}",
            self.cluster.as_deref().unwrap_or("-")
        )?;
        Ok(())
    }
}

impl TableDisplay for Cluster {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Cluster: {}", self.name)?;
        writeln!(writer, "  Status:  {:?}", self.status)?;
        writeln!(writer, "  Hosts:   {}", self.host_count)?;
        Ok(())
    }
}

/// Generated passhash output.
#[derive(Debug, Clone, Serialize)]
pub struct PasshashOutput {
    /// The encoded bcrypt hash.
    pub passhash: String,
    /// Work factor encoded in the hash.
    pub cost: u32,
}

impl TableDisplay for PasshashOutput {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        // Bare hash so the output can be pasted into the user store
        writeln!(writer, "{}", self.passhash)?;
        Ok(())
    }
}

/// Simple message output.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
}

impl Message {
    /// Create a success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "✓ {}", self.message)?;
        Ok(())
    }
}
