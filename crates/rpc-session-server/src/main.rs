//! rpc-session server binary.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use rpc_session::SessionStore;
use rpc_session_server::config::{resolve_config, ServerConfig};
use rpc_session_server::protocol::ProtocolHandler;
use rpc_session_server::transport::StdioTransport;
use rpc_session_server::MethodRegistry;

#[derive(Parser)]
#[command(
    name = "rpc-session-server",
    about = "JSON-RPC session service with idle expiry and push subscriptions",
    version
)]
struct Cli {
    /// Configuration file path. Falls back to $RPC_SESSION_CONFIG.
    #[arg(short, long)]
    config: Option<String>,

    /// Idle timeout in seconds; 0 disables expiry. Overrides the config file.
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve over stdin/stdout (default).
    Serve,

    /// Serve over HTTP, delivering pushes as Server-Sent Events.
    #[cfg(feature = "sse")]
    ServeHttp {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },

    /// Print the method table as JSON and exit.
    Info,
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout belongs to the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(timeout) = cli.timeout {
        config.session.timeout = Some(timeout);
    }
    Ok(config)
}

fn build_handler(config: &ServerConfig) -> ProtocolHandler {
    let store: Arc<SessionStore> = SessionStore::start(config.session.clone());
    ProtocolHandler::new(store, config)
}

fn method_table(config: &ServerConfig) -> Value {
    let registry = MethodRegistry::new(&config.prefix, &config.admin_permission);
    let methods: Vec<Value> = registry
        .definitions()
        .iter()
        .map(|d| {
            json!({
                "name": d.name,
                "description": d.description,
                "access": d.access,
                "params": d.params.schema(),
            })
        })
        .collect();

    json!({
        "server": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "prefix": registry.prefix(),
        "adminPermission": config.admin_permission,
        "sessionTimeout": config.session.idle_timeout(),
        "methods": methods,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let config = load(&cli)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let transport = StdioTransport::new(build_handler(&config));
            transport.run().await?;
            transport.handler().shutdown();
        }

        #[cfg(feature = "sse")]
        Commands::ServeHttp { addr } => {
            let transport =
                rpc_session_server::transport::SseTransport::new(build_handler(&config));
            transport.run(&addr).await?;
            transport.handler().shutdown();
        }

        Commands::Info => {
            println!("{}", serde_json::to_string_pretty(&method_table(&config))?);
        }
    }

    Ok(())
}
