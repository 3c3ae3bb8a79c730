use std::net::{IpAddr, SocketAddr};

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use glimmer_api::auth::AppStateInner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "glimmer=debug,glimmer_api=debug,glimmer_db=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let host = std::env::var("GLIMMER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("GLIMMER_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;
    let database_url = std::env::var("DATABASE_URL").ok();

    let store = glimmer_db::open(database_url.as_deref())?;
    let state = AppStateInner::new(store);

    let app = glimmer_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = bind_addr(&host, port)?;
    info!("Glimmer server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Accepts bare IPv4 or IPv6 literals such as `0.0.0.0` or `::`.
fn bind_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((host.parse::<IpAddr>()?, port)))
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
