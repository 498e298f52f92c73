//! # Listings API Server
//!
//! REST backend for a real-estate listings application, providing:
//! - Property CRUD with paginated, filtered search
//! - Image upload and serving
//! - Username/password authentication with JWT sessions
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p listings-api
//! ```

use listings_api::{
    app::{build_router, AppState},
    config::Config,
};
use listings_shared::db;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listings_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Listings API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = db::pool::create_pool(db::pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    db::migrations::run_migrations(&pool).await?;

    if !config.api.auth_enabled {
        tracing::warn!("Authentication is disabled; admin routes are open");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
