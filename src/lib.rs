pub mod adapters;
mod app;
pub mod auth;
pub mod changes;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ports;
pub mod push;
mod state;
pub mod store;
pub mod types;

pub use app::app;
pub use error::ServeError;
pub use push::generate_vapid_credentials;

use std::net::SocketAddr;

pub async fn serve(addr: SocketAddr, config: config::AppConfig) -> Result<(), ServeError> {
    let router = app(config)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, router).await?;
    Ok(())
}
