use std::sync::Arc;

use menu_recommender::{
    config::Config,
    routes::{create_router, AppState},
    services::sources::CsvDirectorySource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menu_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let source = Arc::new(CsvDirectorySource::new(
        config.data_dir.clone(),
        config.menu_file.clone(),
    ));
    let state = Arc::new(AppState::new(source, config.neighbors, config.limits()));

    // The server still starts on bad data; recommendations answer 503 until a reload succeeds.
    if let Err(e) = state.reload().await {
        tracing::error!(
            error = %e,
            data_dir = %config.data_dir.display(),
            "Initial training failed"
        );
    }

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
