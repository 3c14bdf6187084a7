//! Census CLI - serves the U.S. Census API to AI assistants over MCP.

mod demo;
mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use census_api::{CensusClient, MockCensusClient};
use census_core::{CensusProvider, Config, Transport};
use census_mcp::{sse, McpServer, ToolHandler};
use census_pipeline::Formatter;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "census")]
#[command(author, version, about = "Census MCP - U.S. Census data for AI assistants", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Transport type (stdio or sse)
    #[arg(short, long)]
    transport: Option<Transport>,

    /// Run the offline demonstration against sample data and exit
    #[arg(long)]
    test: bool,

    /// Census API key (falls back to CENSUS_API_KEY, then the config file)
    #[arg(short, long)]
    key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Port for the SSE transport
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print one value (e.g. `census.base_url`)
    Get { key: String },

    /// Set one value (e.g. `server.port 9000`)
    Set { key: String, value: String },

    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.resolve_log_level(cli.log_level.as_deref())
    };
    logging::init(&level, config.resolve_log_file().as_deref())?;

    if let Some(Commands::Config { command }) = cli.command {
        return run_config_command(command, config, &config_path);
    }

    info!(test_mode = cli.test, log_level = level.as_str(), "Starting Census MCP");

    let provider: Arc<dyn CensusProvider> = if cli.test {
        Arc::new(MockCensusClient::new())
    } else {
        let api_key = config.resolve_api_key(cli.key.as_deref())?;
        match &config.census.base_url {
            Some(url) => Arc::new(CensusClient::with_base_url(url, api_key)),
            None => Arc::new(CensusClient::new(api_key)),
        }
    };
    info!(provider = provider.provider_name(), "Census provider ready");

    if cli.test {
        let mut stdout = std::io::stdout().lock();
        return demo::run(provider.as_ref(), &Formatter::new(), &mut stdout).await;
    }

    let handler = Arc::new(ToolHandler::new(provider));
    let transport = cli.transport.unwrap_or(config.server.transport);
    info!(transport = %transport, "Starting MCP server");

    match transport {
        Transport::Stdio => McpServer::new(handler).run_stdio().await?,
        Transport::Sse => {
            let port = cli.port.unwrap_or(config.server.port);
            let addr = tokio::net::lookup_host((config.server.host.as_str(), port))
                .await
                .with_context(|| format!("Failed to resolve {}", config.server.host))?
                .next()
                .with_context(|| format!("No address for {}", config.server.host))?;
            sse::serve(handler, addr).await?;
        }
    }

    info!("Server stopped");
    Ok(())
}

fn run_config_command(command: ConfigCommands, mut config: Config, path: &Path) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => {
            if let Some(key) = config.census.api_key.as_mut() {
                *key = mask_secret(key);
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommands::Get { key } => match config.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(not set)"),
        },
        ConfigCommands::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to(path)?;
            info!(key = key.as_str(), "Config updated");
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }

    Ok(())
}

/// Keep the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["census"]).unwrap();

        assert!(!cli.test);
        assert!(!cli.verbose);
        assert!(cli.transport.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "census", "-t", "sse", "--port", "9000", "-k", "secret", "--log-level", "warn",
        ])
        .unwrap();

        assert_eq!(cli.transport, Some(Transport::Sse));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.key.as_deref(), Some("secret"));
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_unknown_transport_rejected() {
        assert!(Cli::try_parse_from(["census", "--transport", "websocket"]).is_err());
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["census", "config", "set", "server.port", "9000"]).unwrap();
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Set { key, value },
            }) => {
                assert_eq!(key, "server.port");
                assert_eq!(value, "9000");
            }
            _ => panic!("expected config set"),
        }

        let cli = Cli::try_parse_from(["census", "config", "show", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_config_set_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        run_config_command(
            ConfigCommands::Set {
                key: "server.transport".to_string(),
                value: "sse".to_string(),
            },
            Config::default(),
            &path,
        )
        .unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.server.transport, Transport::Sse);
    }

    #[test]
    fn test_config_set_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let result = run_config_command(
            ConfigCommands::Set {
                key: "census.token".to_string(),
                value: "x".to_string(),
            },
            Config::default(),
            &path,
        );

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdef123456"), "********3456");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "");
    }
}
