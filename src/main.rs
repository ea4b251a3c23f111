use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use rally_up::config::Settings;
use rally_up::core::{LatestResults, PlayerSearch};
use rally_up::error::{handle_json_payload_error, handle_query_payload_error};
use rally_up::routes::{self, AppState};
use rally_up::services::{AppwriteClient, AppwriteCollections, ZippopotamClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Rally Up player service...");

    // Initialize Appwrite client
    let collections = AppwriteCollections {
        players: settings.collection.players,
        profile_images: settings.collection.profile_images,
        roster_limit: settings.collection.roster_limit,
    };

    let appwrite = Arc::new(
        AppwriteClient::new(
            settings.appwrite.endpoint,
            settings.appwrite.api_key,
            settings.appwrite.project_id,
            settings.appwrite.database_id,
            collections,
        )
        .map_err(|e| {
            error!("Failed to create Appwrite client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?,
    );

    info!("Appwrite client initialized");

    let geocoder = Arc::new(
        ZippopotamClient::new(
            settings.geocoding.base_url.clone(),
            settings.geocoding.country.clone(),
            settings.geocoding.timeout_secs,
        )
        .map_err(|e| {
            error!("Failed to create geocoding client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?,
    );

    info!(
        "Geocoder initialized ({} / {})",
        settings.geocoding.base_url, settings.geocoding.country
    );

    // Build application state
    let app_state = AppState {
        identity: appwrite.clone(),
        profiles: appwrite.clone(),
        images: appwrite,
        search: PlayerSearch::new(geocoder),
        latest: Arc::new(LatestResults::new()),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
