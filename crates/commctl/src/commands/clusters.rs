//! Cluster management commands.

use std::io::Write;

use tracing::debug;

use commctl_client::{ApiClient, ClusterSpec};

use crate::cli::ClusterCommands;
use crate::commands::{read_spec, validate_cluster_name};
use crate::error::CliError;
use crate::output::{ClusterNameList, Message, OutputFormat, render};

/// Executor for `commctl clusters` subcommands.
pub struct ClustersCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> ClustersCommand<'a> {
    /// Create a new executor backed by an API client.
    #[must_use]
    pub const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a cluster subcommand and render its output.
    ///
    /// # Errors
    ///
    /// Returns an error if validation, the API call, or rendering fails.
    /// Nothing is written to the writer on failure.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: ClusterCommands,
    ) -> Result<(), CliError> {
        match command {
            ClusterCommands::List => self.list(writer, format).await,
            ClusterCommands::Get { name } => self.get(writer, format, &name).await,
            ClusterCommands::Create { spec_file } => {
                let spec: ClusterSpec = read_spec(&spec_file)?;
                self.create(writer, format, &spec).await
            }
            ClusterCommands::Delete { name } => self.delete(writer, format, &name).await,
        }
    }

    async fn list<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        debug!("listing clusters");
        let clusters = self.client.list_clusters().await?;
        render(writer, format, &ClusterNameList { clusters })
    }

    async fn get<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        name: &str,
    ) -> Result<(), CliError> {
        validate_cluster_name(name)?;
        debug!(name, "fetching cluster");
        let cluster = self.client.get_cluster(name).await?;
        render(writer, format, &cluster)
    }

    async fn create<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        spec: &ClusterSpec,
    ) -> Result<(), CliError> {
        validate_cluster_name(&spec.name)?;
        debug!(name = %spec.name, kind = %spec.kind, "creating cluster");
        self.client.create_cluster(spec).await?;
        render(
            writer,
            format,
            &Message::success(format!("cluster {} created", spec.name)),
        )
    }

    async fn delete<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        name: &str,
    ) -> Result<(), CliError> {
        validate_cluster_name(name)?;
        debug!(name, "deleting cluster");
        self.client.delete_cluster(name).await?;
        render(
            writer,
            format,
            &Message::success(format!("cluster {name} deleted")),
        )
    }
}
