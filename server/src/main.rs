use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};
use wikisearch_server::{build_app, ServerOptions};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// Mirror directory that absent posting blocks are copied from
    #[arg(long)]
    block_mirror: Option<PathBuf>,
    /// Per-query deadline in milliseconds
    #[arg(long)]
    query_timeout_ms: Option<u64>,
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
    let options = ServerOptions {
        index_dir: args.index,
        block_mirror: args.block_mirror,
        query_timeout: args.query_timeout_ms.map(Duration::from_millis),
    };
    let app: Router = build_app(&options)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, index = %options.index_dir.display(), "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
