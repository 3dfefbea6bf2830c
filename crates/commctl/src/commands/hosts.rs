//! Host management commands.

use std::io::Write;

use tracing::debug;

use commctl_client::{ApiClient, Host, HostSpec};

use crate::cli::HostCommands;
use crate::commands::{read_spec, validate_cluster_name, validate_host_address};
use crate::error::CliError;
use crate::output::{AddressList, HostList, Message, OutputFormat, render};

/// Executor for `commctl hosts` subcommands.
pub struct HostsCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> HostsCommand<'a> {
    /// Create a new executor backed by an API client.
    #[must_use]
    pub const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a host subcommand and render its output.
    ///
    /// # Errors
    ///
    /// Returns an error if validation, the API call, or rendering fails.
    /// Nothing is written to the writer on failure.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: HostCommands,
    ) -> Result<(), CliError> {
        match command {
            HostCommands::List { cluster: None } => self.list(writer, format).await,
            HostCommands::List {
                cluster: Some(name),
            } => self.list_in_cluster(writer, format, &name).await,
            HostCommands::Get { address } => self.get(writer, format, &address).await,
            HostCommands::Create { spec_file } => {
                let spec: HostSpec = read_spec(&spec_file)?;
                self.create(writer, format, &spec).await
            }
            HostCommands::Delete { address } => self.delete(writer, format, &address).await,
        }
    }

    async fn list<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        debug!("listing all hosts");
        let hosts = self.client.list_hosts().await?;
        render(writer, format, &HostList { hosts })
    }

    async fn list_in_cluster<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        cluster: &str,
    ) -> Result<(), CliError> {
        validate_cluster_name(cluster)?;
        debug!(cluster, "listing cluster hosts");
        let addresses = self.client.list_cluster_hosts(cluster).await?;
        render(writer, format, &AddressList { addresses })
    }

    async fn get<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        address: &str,
    ) -> Result<(), CliError> {
        validate_host_address(address)?;
        debug!(address, "fetching host");
        let host: Host = self.client.get_host(address).await?;
        render(writer, format, &host)
    }

    async fn create<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        spec: &HostSpec,
    ) -> Result<(), CliError> {
        validate_host_address(&spec.address)?;
        if let Some(cluster) = &spec.cluster {
            validate_cluster_name(cluster)?;
        }
        if spec.ssh_priv_key.is_empty() {
            return Err(CliError::InvalidArgument(
                "spec field 'ssh_priv_key' must not be empty".to_string(),
            ));
        }
        debug!(address = %spec.address, "registering host");
        self.client.create_host(spec).await?;
        render(
            writer,
            format,
            &Message::success(format!("host {} submitted", spec.address)),
        )
    }

    async fn delete<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        address: &str,
    ) -> Result<(), CliError> {
        validate_host_address(address)?;
        debug!(address, "deleting host");
        self.client.delete_host(address).await?;
        render(
            writer,
            format,
            &Message::success(format!("host {address} deleted")),
        )
    }
}
