//! # Pawshop API Server
//!
//! The storefront and back-office API: authentication, catalog, cart,
//! checkout, and payment-gateway reconciliation over PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p pawshop-api
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pawshop_api::{
    app::{build_router, AppState},
    config::Config,
    email::EmailService,
    gateway::PaymentGateway,
};
use pawshop_shared::db::{migrations, pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pawshop_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Pawshop API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    tokio::fs::create_dir_all(&config.api.upload_dir).await?;

    let mailer = EmailService::new(&config.email, &config.api)?;
    let gateway = PaymentGateway::new(&config.gateway);

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, mailer, gateway);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
