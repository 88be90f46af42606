use auth_service::config::Config;
use auth_service::handlers::auth_handler::AppState;
use auth_service::repositories::users::{PgUserStore, UserStore};
use auth_service::routes;
use auth_service::services::token_service::{JwtTokenService, TokenAuthority};
use auth_service::services::user_service::UserService;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Auth Service");

    // Load configuration. A missing or malformed JWT secret/expiry stops startup here.
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");

    let metrics_handle = routes::init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    info!("Connecting to database...");
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    info!("Database connection established");

    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            e
        })?;

    // Wire the store, token authority and orchestrator
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db_pool));
    let tokens: Arc<dyn TokenAuthority> = Arc::new(
        JwtTokenService::new(&config, Arc::clone(&users)).map_err(|e| {
            error!("Failed to initialize token service: {}", e);
            e
        })?,
    );
    let user_service =
        UserService::new(users, Arc::clone(&tokens), config.bcrypt_cost).map_err(|e| {
            error!("Failed to initialize user service: {}", e);
            e
        })?;

    let state = Arc::new(AppState {
        users: user_service,
        tokens,
    });

    let app = routes::build_routes(
        state,
        metrics_handle,
        Duration::from_secs(config.request_timeout_seconds),
    );

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Auth Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auth Service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
