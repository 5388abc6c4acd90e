//! Biblio Server - Library Reservation System
//!
//! A small Rust REST API server for managing books, readers, and
//! reservations.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::Request,
    routing::{delete, get, post, put},
    Router, ServiceExt,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePathLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("biblio_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Biblio Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool. WAL mode keeps readers from
    // blocking the writer; foreign keys must be switched on per
    // connection in SQLite.
    let connect_options = SqliteConnectOptions::from_str(&config.database.url)
        .expect("Invalid database URL")
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_with(connect_options)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.reservations.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router; trailing slashes are trimmed so /api/books/ and
    // /api/books reach the same handler.
    let app = NormalizePathLayer::trim_trailing_slash().layer(create_router(state));

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Books (catalog)
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        // Readers
        .route("/readers", get(api::readers::list_readers))
        .route("/readers", post(api::readers::create_reader))
        .route("/readers/:id", get(api::readers::get_reader))
        .route("/readers/:id", put(api::readers::update_reader))
        .route("/readers/:id", delete(api::readers::delete_reader))
        // Reservations
        .route("/reservations", get(api::reservations::list_reservations))
        .route("/reservations", post(api::reservations::create_reservation))
        .route("/reservations/:id", get(api::reservations::get_reservation))
        .route(
            "/reservations/:id/return",
            post(api::reservations::return_reservation),
        )
        .route(
            "/reservations/:id/reopen",
            post(api::reservations::reopen_reservation),
        )
        // Statistics
        .route("/stats", get(api::stats::get_stats))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api", api)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
