use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use server::{build_app, AppConfig};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Directory of extracted document text
    #[arg(long, default_value = "./docs")]
    docs: PathBuf,
    /// File extension of documents to index
    #[arg(long, default_value = "txt")]
    ext: String,
    /// Number of document texts kept in memory for snippets (0 disables)
    #[arg(long, default_value_t = 64)]
    cache_capacity: usize,
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
    let config = AppConfig {
        docs_dir: args.docs,
        extension: args.ext,
        cache_capacity: args.cache_capacity,
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
