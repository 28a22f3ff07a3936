use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use fieldrank_core::ModelRegistry;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use server::{build_app, ServerConfig};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// JSON file with an array of model configs overriding the defaults
    #[arg(long)]
    models: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let models = match &args.models {
        Some(path) => ModelRegistry::from_json(&std::fs::read_to_string(path)?)
            .with_context(|| format!("parsing model configs in {path}"))?,
        None => ModelRegistry::new(),
    };
    let app: Router = build_app(ServerConfig::from_env(&args.index, models))?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
