//! Meshi Backend entry point

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meshi_backend::app::{AppState, build_app};
use meshi_backend::config::{Config, LogFormat};
use meshi_backend::db::Database;
use meshi_backend::graphql;
use meshi_backend::services::{IdentityVerifier, JwtVerifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    init_tracing(&config);
    tracing::info!("Starting Meshi Backend");

    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "Database connected"
    );

    let verifier: Option<Arc<dyn IdentityVerifier>> = match config.auth_jwt_secret.as_deref() {
        Some(secret) => Some(Arc::new(JwtVerifier::new(
            secret,
            config.auth_jwt_issuer.as_deref(),
            config.auth_jwt_audience.as_deref(),
        ))),
        None => {
            tracing::warn!("AUTH_JWT_SECRET not set, all requests are anonymous");
            None
        }
    };

    let schema = graphql::build_schema(db.clone());
    tracing::info!("GraphQL schema built");

    let app = build_app(AppState {
        db,
        schema,
        verifier,
    });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://localhost:{}/graphql", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_filter.clone().into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}
