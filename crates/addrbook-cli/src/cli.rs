//! CLI argument parsing

use crate::commands;
use addrbook_client::{load_dotenv, ApiClient, ClientConfig};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// addrbook - manage your addresses from the terminal
#[derive(Parser, Debug)]
#[command(name = "addrbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API root, e.g. http://localhost:8080/api/ (overrides ADDRBOOK_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log debug output, including every request
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive session (default)
    Shell,

    /// Ask the server whether this client is signed in, then exit
    Check,
}

impl Cli {
    /// Install the global tracing subscriber
    ///
    /// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
    pub fn init_tracing(&self) {
        let fallback = if self.verbose {
            "addrbook_client=debug,addrbook=debug"
        } else {
            "addrbook_client=warn,addrbook=info"
        };
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }

    fn config(&self) -> anyhow::Result<ClientConfig> {
        load_dotenv();
        let mut config =
            ClientConfig::from_env().context("failed to read ADDRBOOK_* environment")?;
        if let Some(url) = &self.base_url {
            config = config.base_url(url.clone());
        }
        Ok(config)
    }

    /// Execute the CLI command
    pub async fn execute(self) -> anyhow::Result<()> {
        let client = ApiClient::new(self.config()?).context("failed to set up the API client")?;
        match self.command.unwrap_or(Commands::Shell) {
            Commands::Shell => commands::shell(client).await,
            Commands::Check => commands::check(client).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_shell_is_default() {
        let cli = Cli::try_parse_from(["addrbook", "--base-url", "http://h/api/"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.base_url.as_deref(), Some("http://h/api/"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["addrbook", "check", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Check)));
    }
}
