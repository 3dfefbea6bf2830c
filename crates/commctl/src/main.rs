//! Commissaire CLI binary entrypoint.
//!
//! This is the main entry point for the `commctl` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commctl::cli::{Cli, Commands};
use commctl::commands::{ClustersCommand, HostsCommand, PasshashCommand};
use commctl::error::CliError;
use commctl::output::OutputFormat;
use commctl_client::ApiClient;
use commctl_config::{EnvSnapshot, resolve};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_until_interrupted(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Races the command against Ctrl-C so an interrupt exits with the
/// conventional signal code instead of hanging on retries.
async fn run_until_interrupted(cli: Cli) -> Result<(), CliError> {
    tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    }
}

/// Builds the API client from the resolved configuration.
fn connect(cli: &Cli) -> Result<ApiClient, CliError> {
    let config = resolve(
        cli.config.as_deref(),
        &EnvSnapshot::from_process(),
        &cli.flag_overrides(),
        cli.command.requires_auth(),
    )?;
    Ok(ApiClient::new(&config)?)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Hosts { ref command } => {
            let client = connect(&cli)?;
            let cmd = HostsCommand::new(&client);
            cmd.execute(&mut stdout, &format, command.clone()).await?;
        }
        Commands::Clusters { ref command } => {
            let client = connect(&cli)?;
            let cmd = ClustersCommand::new(&client);
            cmd.execute(&mut stdout, &format, command.clone()).await?;
        }
        Commands::Create {
            command: commctl::cli::CreateCommands::Passhash(ref args),
        } => {
            // Local only, no config resolution or network
            let mut stdin = io::stdin().lock();
            PasshashCommand::execute(&mut stdout, &mut stdin, &format, args)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commctl::cli::Format;

    #[test]
    fn cli_parses_hosts_list() {
        let cli = Cli::parse_from(["commctl", "hosts", "list"]);
        assert!(matches!(cli.command, Commands::Hosts { .. }));
    }

    #[test]
    fn cli_respects_format_flag() {
        let cli = Cli::parse_from(["commctl", "--format", "table", "clusters", "list"]);
        assert_eq!(cli.format, Format::Table);
    }

    #[tokio::test]
    async fn run_fails_cleanly_without_credentials() {
        // No config file, no env, no flags: auth resolution must fail
        // before any network traffic.
        let cli = Cli::parse_from([
            "commctl",
            "--config",
            "/nonexistent/commissaire.json",
            "hosts",
            "list",
        ]);
        let result = run(cli).await;
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[tokio::test]
    async fn run_rejects_invalid_server_url() {
        let cli = Cli::parse_from([
            "commctl",
            "--config",
            "/nonexistent/commissaire.json",
            "--server",
            "ftp://example.com",
            "--token",
            "sekrit",
            "clusters",
            "list",
        ]);
        let result = run(cli).await;
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
