use progress_tracker::{router, AppState, Config, FileStorage, ProgressStore};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    let storage = FileStorage::new(&config.data_dir);
    let store = tokio::task::spawn_blocking(move || ProgressStore::load(storage)).await?;
    info!(
        days = store.tasks().len(),
        data_dir = %store.storage().dir().display(),
        "loaded progress store"
    );

    let app = router(AppState::new(&config, store));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
