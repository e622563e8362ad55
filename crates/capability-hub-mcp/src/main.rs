//! Capability Hub MCP server: entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use capability_hub::{CapabilityKind, Dispatcher, PathSandbox};
use capability_hub_mcp::config::{load_config, Environment, ServerConfig, Transport};
use capability_hub_mcp::metrics::Metrics;
use capability_hub_mcp::protocol::ProtocolHandler;
use capability_hub_mcp::transport::StdioTransport;
use capability_hub_mcp::types::InitializeResult;

#[derive(Parser)]
#[command(
    name = "capability-hub-mcp",
    about = "MCP server exposing tools, resources and prompts over stdio or HTTP",
    version
)]
struct Cli {
    /// Configuration file path (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transport: stdio, http or streamable-http.
    #[arg(short, long)]
    transport: Option<Transport>,

    /// Listen host for the HTTP transports.
    #[arg(long)]
    host: Option<String>,

    /// Listen port for the HTTP transports.
    #[arg(short, long)]
    port: Option<u16>,

    /// Root directory for the file tools.
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Deployment environment (development, testing, production).
    #[arg(long)]
    environment: Option<Environment>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server on the configured transport (default).
    Serve,

    /// Validate the configuration and the capability catalog, then exit.
    Validate,

    /// Print server capabilities as JSON.
    Info,
}

impl Cli {
    /// Flags win over the file and the environment.
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(workspace) = &self.workspace {
            config.workspace_dir = workspace.clone();
        }
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    // Initialize logging. Stdout belongs to the stdio transport.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if config.is_production() && config.debug {
        tracing::warn!("Debug mode is enabled in production");
    }
    if config.is_development() && config.transport.is_http() && config.host != "127.0.0.1" {
        tracing::warn!(host = %config.host, "Development server is reachable beyond localhost");
    }

    let config = Arc::new(config);
    let sandbox = Arc::new(PathSandbox::new(&config.workspace_dir)?);
    let registry = Arc::new(capability_hub_mcp::build_registry(config.clone(), sandbox)?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!(
                app = %config.app_name,
                version = %config.version,
                environment = %config.environment,
                transport = %config.transport,
                "Starting server"
            );

            let dispatcher = Dispatcher::new(registry);
            let handler = ProtocolHandler::new(dispatcher, config.clone(), Arc::new(Metrics::new()));

            match config.transport {
                Transport::Stdio => StdioTransport::new(handler).run().await?,
                #[cfg(feature = "http")]
                transport @ (Transport::Http | Transport::StreamableHttp) => {
                    let server =
                        capability_hub_mcp::transport::HttpTransport::new(handler, transport)?;
                    server.run(&config.bind_addr()).await?;
                }
                #[cfg(not(feature = "http"))]
                other => anyhow::bail!("transport '{other}' needs the `http` feature"),
            }
        }

        Commands::Validate => {
            println!("Configuration OK: {}", config.app_name);
            println!("  Environment: {}", config.environment);
            println!("  Transport: {}", config.transport);
            println!("  Workspace: {}", config.workspace_dir.display());
            println!("  Tools: {}", registry.count(CapabilityKind::Tool));
            println!("  Resources: {}", registry.count(CapabilityKind::Resource));
            println!(
                "  Resource templates: {}",
                registry.count(CapabilityKind::ResourceTemplate)
            );
            println!("  Prompts: {}", registry.count(CapabilityKind::Prompt));
        }

        Commands::Info => {
            let capabilities = InitializeResult::for_server(&config.app_name, &config.version);
            let names = |kind: CapabilityKind| {
                registry
                    .list(kind)
                    .map(|d| d.identity().to_string())
                    .collect::<Vec<_>>()
            };
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "transport": config.transport,
                "tools": names(CapabilityKind::Tool),
                "resources": names(CapabilityKind::Resource),
                "resource_templates": registry
                    .all_templates()
                    .map(|d| d.identity().to_string())
                    .collect::<Vec<_>>(),
                "prompts": names(CapabilityKind::Prompt),
                "tool_count": registry.count(CapabilityKind::Tool),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
