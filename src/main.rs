use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use civic_match::config::{Settings, StorageBackend};
use civic_match::routes::{self, AppState};
use civic_match::services::{CandidateSource, ContributionSource, MemoryStore, PostgresStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    // LOG_LEVEL / LOG_FORMAT win over the config file
    let (level, format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting civic-match service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e))
    })?;

    info!("Configuration loaded successfully");

    match settings.storage.backend {
        StorageBackend::Memory => {
            let store = match &settings.storage.seed_path {
                Some(path) => {
                    let store = MemoryStore::from_json_file(path).map_err(|e| {
                        error!("Failed to load seed data from {}: {}", path, e);
                        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
                    })?;
                    info!("Loaded {} candidates from {}", store.candidate_count().await, path);
                    store
                }
                None => {
                    warn!("In-memory storage without storage.seed_path, every query will be empty");
                    MemoryStore::new()
                }
            };
            warn!("Using in-memory storage, data is lost on restart");
            serve(store, settings).await
        }
        StorageBackend::Postgres => {
            let db = &settings.database;
            let store = PostgresStore::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
            })?;

            info!(
                "PostgreSQL store initialized (max: {} connections)",
                db.max_connections.unwrap_or(10)
            );
            serve(store, settings).await
        }
    }
}

async fn serve<S>(source: S, settings: Settings) -> std::io::Result<()>
where
    S: CandidateSource + ContributionSource + Clone + 'static,
{
    let app_state = AppState::from_settings(source, &settings);

    info!(
        "Matcher initialized (max radius: {}km, tie band: {}km)",
        app_state.matches.matcher().filter().max_radius_km(),
        app_state.matches.matcher().tie_band_km()
    );

    // The interval's first tick fires immediately, so this also builds the initial table
    let refresh_secs = settings.leaderboard.refresh_interval_secs;
    let refresh_task = if refresh_secs > 0 {
        info!("Leaderboard refresh every {}s", refresh_secs);
        Some(Arc::clone(&app_state.leaderboard).spawn_refresh(Duration::from_secs(refresh_secs)))
    } else {
        if let Err(e) = app_state.leaderboard.refresh().await {
            warn!("Initial leaderboard build failed: {}", e);
        }
        None
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes::<S>)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    if let Some(task) = refresh_task {
        task.abort();
    }

    result
}
