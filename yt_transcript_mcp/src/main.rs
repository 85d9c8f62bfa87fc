use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use std::process;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_transcript_core::{
    config::{ServerConfig, Transport},
    logging::LogLevel,
    mcp_server::{JsonRpcHandler, McpServer},
    transport::StdioTransport,
};

#[derive(Parser)]
#[command(name = "yt-transcript-mcp")]
#[command(about = "YouTube Transcript MCP Server")]
#[command(version)]
struct Cli {
    /// Transport to serve the protocol on
    #[arg(long, value_enum, default_value_t = TransportArg::Stdio)]
    transport: TransportArg,

    /// YouTube Data API key for enhanced features (optional)
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Run a simple test to verify server startup
    #[arg(long)]
    test: bool,

    /// Set logging level (DEBUG, INFO, WARNING, ERROR); RUST_LOG overrides it
    #[arg(long, default_value = "INFO", value_parser = clap::value_parser!(LogLevel))]
    log_level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum TransportArg {
    Stdio,
}

impl From<TransportArg> for Transport {
    fn from(value: TransportArg) -> Self {
        match value {
            TransportArg::Stdio => Transport::Stdio,
        }
    }
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        ServerConfig {
            transport: cli.transport.into(),
            log_level: cli.log_level,
            api_key: cli.api_key,
        }
    }
}

fn init_logging(level: LogLevel) {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.as_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// List the registered tools and report whether startup works.
async fn self_check(config: &ServerConfig) -> bool {
    match yt_transcript_core::build_registry(config).await {
        Ok(registry) => {
            let tools = registry.get_provider_tools().await;
            println!("{} Server startup successful", "✓".green());
            println!("{} Available tools: {}", "✓".green(), tools.len());
            for tool in tools {
                println!(
                    "  - {}: {}",
                    tool.name.bold(),
                    tool.description.as_deref().unwrap_or_default()
                );
            }
            true
        }
        Err(e) => {
            println!("{} Server test failed: {}", "✗".red(), e);
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let run_self_check = cli.test;
    let config = ServerConfig::from(cli);

    init_logging(config.log_level);

    if config.api_key.is_some() {
        info!("API key configured");
    }

    if run_self_check {
        let ok = self_check(&config).await;
        process::exit(if ok { 0 } else { 1 });
    }

    info!("Starting YouTube Transcript MCP Server...");

    let registry = yt_transcript_core::build_registry(&config).await?;
    for provider in registry.list_providers() {
        info!(connector = %provider.name, "{}", provider.description);
    }
    let registry = Arc::new(Mutex::new(registry));

    let server = McpServer::new(registry);
    let handler = JsonRpcHandler::new(server);

    match config.transport {
        Transport::Stdio => {
            let transport = StdioTransport::new(handler);
            info!("MCP Server ready, listening on stdio");

            tokio::select! {
                result = transport.run() => {
                    if let Err(e) = result {
                        error!("Server error: {}", e);
                        return Err(e.into());
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Server shutdown requested");
                }
            }
        }
    }

    Ok(())
}
