mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blackbook_core::config::AppConfig;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "blackbook-server", about = "HTTP server for blackbook")]
struct Args {
    /// Config file to use instead of ~/.config/blackbook/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(long)]
    listen: Option<SocketAddr>,
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::masterdata::router())
        .merge(routes::events::router())
        .merge(routes::sessions::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blackbook=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    let state = AppState::new(&config)?;
    let app = app(state);

    info!(addr = %config.listen, "blackbook-server listening");
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
