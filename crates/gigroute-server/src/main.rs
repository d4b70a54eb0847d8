mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(gigroute_core::load_app_config_from_env()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = match config.catalog_api_key.as_deref() {
        Some(key) => Some(gigroute_catalog::CatalogClient::new(
            &config.catalog_base_url,
            Some(key.to_owned()),
            config.catalog_timeout_secs,
            config.catalog_max_retries,
            config.catalog_backoff_base_ms,
        )?),
        None => {
            tracing::warn!(
                "GIGROUTE_CATALOG_API_KEY not set; discovery will use the demo catalog"
            );
            None
        }
    };

    let engine = Arc::new(gigroute_discovery::DiscoveryEngine::new(
        catalog,
        gigroute_discovery::VenueStore::demo_directory(),
        gigroute_discovery::PerformerStore::demo_roster(),
        Duration::from_secs(config.cache_ttl_secs),
        config.scoring_weights,
        config.max_concurrent_fetches,
        Duration::from_secs(config.catalog_timeout_secs.saturating_add(5)),
    ));

    let app = build_app(AppState {
        engine,
        config: Arc::clone(&config),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "gigroute server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
