use anyhow::Result;
use axum::Router;
use clap::Parser;
use fts_core::config::DEFAULT_CONFIG_FILE;
use fts_core::Config;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use fts_server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// Tokenizer configuration (JSON)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,
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
    let config = Config::from_file(&args.config)?;
    let app: Router = build_app(args.index.clone(), config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
