use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use bloodbridge::config::{LoggingSettings, Settings};
use bloodbridge::routes::{self, AppState};
use bloodbridge::services::Directory;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "json" => subscriber.json().init(),
        "pretty" => subscriber.pretty().init(),
        _ => subscriber.init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is configured from settings, so this goes straight to stderr
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting Bloodbridge matching service...");

    let directory = match settings.directory.seed_path.as_deref() {
        Some(path) => Directory::load_seed_async(path).await.map_err(|e| {
            error!("Failed to load directory seed from {}: {}", path, e);
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        })?,
        None => {
            info!("No seed file configured, starting with an empty directory");
            Directory::new()
        }
    };

    let app_state = AppState::new(Arc::new(directory), settings.matching.clone());

    info!(
        "Matcher ready (emergency radius: {}km, default service radius: {}km, max limit: {})",
        settings.matching.emergency_radius_km,
        settings.matching.default_service_radius_km,
        settings.matching.max_limit
    );

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::configure_extractors)
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
