//! ctxforge CLI - runs the context-engineering MCP server

use anyhow::Result;
use clap::{Parser, Subcommand};
use ctxforge_core::config::ServerConfig;
use ctxforge_core::mcp::{McpServer, StdioTransport};

#[derive(Parser)]
#[command(name = "ctxforge")]
#[command(about = "Context-engineering MCP server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio (newline-delimited JSON-RPC)
    Serve,
    /// Print the command catalog as JSON and exit
    Catalog,
    /// Version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load()?;

    // Logs go to stderr; stdout belongs to the protocol.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter.clone())),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            tracing::info!(name = %config.name, version = %config.version, "starting stdio server");
            let server = McpServer::builder()
                .name(config.name)
                .version(config.version)
                .build();
            server.run(StdioTransport::new()).await?;
            tracing::info!("stdin closed, shutting down");
        }
        Commands::Catalog => {
            let tools: Vec<serde_json::Value> = ctxforge_core::catalog::Command::ALL
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "name": c.name(),
                        "description": c.description(),
                        "inputSchema": c.input_schema(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }
        Commands::Version => {
            println!("ctxforge {}", env!("CARGO_PKG_VERSION"));
            println!("ctxforge-core {}", ctxforge_core::VERSION);
        }
    }

    Ok(())
}
