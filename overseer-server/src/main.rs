use overseer_server::config::{AppConfig, Mode};
use overseer_server::refresh::run_refresher;
use overseer_server::stations::{FeedClient, StationCache, StationRegistry};
use overseer_server::web::{AppState, create_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");
    let feed = FeedClient::new(config.feed.clone()).expect("Failed to create feed client");

    let registry = match &config.mode {
        Mode::Fake { snapshot } => {
            info!(path = %snapshot.display(), "serving fake data");
            let registry = StationRegistry::load_cache(feed, snapshot)
                .expect("Failed to load fake data");
            if registry.is_empty().await {
                warn!("fake data file is missing or empty");
            }
            registry
        }
        Mode::Live {
            cache_path,
            refresh,
        } => {
            let registry = match cache_path {
                Some(path) => StationRegistry::load_cache(feed.clone(), path).unwrap_or_else(|e| {
                    warn!(error = %e, "could not load snapshot, starting empty");
                    StationRegistry::new(feed).with_cache(StationCache::new(path))
                }),
                None => StationRegistry::new(feed),
            }
            .with_concurrency(config.concurrency);

            // Refresh in the background; handlers see updates as they land.
            tokio::spawn(run_refresher(registry.clone(), *refresh));
            registry
        }
    };

    let app = create_router(AppState::new(registry));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind");
    info!(addr = %config.bind, "overseer listening");

    axum::serve(listener, app).await.expect("Server error");
}
