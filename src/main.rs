use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use codeloop::{run_server, CodeLoopCore, Config, ServerConfig, WebAppState};

#[derive(Parser)]
#[command(name = "codeloop", version, about = "CodeLoop web application server")]
struct Cli {
    /// Host address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Data directory (default: ~/.codeloop)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Config file path (default: <data-dir>/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    codeloop::util::init_data_dir(cli.data_dir);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("codeloop=info,tower_http=info")),
        )
        .init();

    let mut config = match cli.config {
        Some(path) => Config::load_from(&path),
        None => Config::load(),
    };
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let server_config = ServerConfig {
        host: config.host.clone(),
        port: config.port,
        cors_permissive: config.cors_permissive,
    };

    let core = CodeLoopCore::new(config);
    let state = WebAppState::new(core);

    run_server(state, server_config).await
}
