use server::config::RelayConfig;
use server::state::AppState;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env: {e}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid relay configuration");
            std::process::exit(2);
        }
    };
    let port = config.port;

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %port, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(%port, queue = config.client_queue, "relay listening");

    tokio::select! {
        result = server::serve(listener, AppState::new(config)) => {
            if let Err(e) = result {
                error!(error = %e, "server failed");
                std::process::exit(1);
            }
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
            info!("relay shutting down");
        }
    }
}
