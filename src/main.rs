//! Occurrence book server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use occurrence_book_lib::api::{self, ApiDoc};
use occurrence_book_lib::config::Config;
use occurrence_book_lib::db::DbPool;
use occurrence_book_lib::middleware::RequestLogger;
use occurrence_book_lib::services::{self, OccurrenceService};
use occurrence_book_lib::storage;
use occurrence_book_lib::store::Repositories;

/// Perform health check (for Docker healthcheck).
fn health_check() -> bool {
    Config::from_env().is_ok()
}

fn exit_on<T, E: std::fmt::Display>(result: Result<T, E>, what: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            error!("{}: {}", what, e);
            std::process::exit(1);
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // --health-check is used by the Docker HEALTHCHECK
    if std::env::args().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if health_check() { 0 } else { 1 });
    }

    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and OB_JWT_SECRET must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Occurrence Book Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = exit_on(DbPool::new(&config).await, "Failed to initialize database");
    info!("Database connection established");

    exit_on(pool.run_migrations().await, "Failed to run migrations");
    info!("Database migrations complete");

    let blobs = exit_on(
        storage::from_settings(&config.storage).await,
        "Failed to initialize blob storage",
    );
    info!("Blob storage ready ({:?} backend)", config.storage.backend);

    let service = OccurrenceService::new(
        Repositories::from_shared(Arc::new(pool.clone())),
        blobs,
        &config.tokens,
    );

    exit_on(service.bootstrap().await, "Failed to seed admin account");

    services::start_reconcile_task(service.clone(), config.reconcile_interval_secs);

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let cors_origins = config.cors_origins.clone();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .max_age(3600);
        // Same-origin only in production
        if is_development {
            for origin in &cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        App::new()
            // CORS must wrap before other middleware
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(service.clone()))
            .app_data(web::Data::new(pool.clone()))
            // Must precede the /api scope
            .service(
                SwaggerUi::new("/api/docs/{_:.*}").url("/api/openapi.json", ApiDoc::openapi()),
            )
            .service(web::scope("/api").configure(api::configure_routes))
    });

    server.workers(worker_count).bind(&bind_address)?.run().await
}
