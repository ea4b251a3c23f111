// Route exports
pub mod auth;
pub mod players;
pub mod profile;
pub mod session;

use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::core::{LatestResults, PlayerSearch};
use crate::models::HealthResponse;
use crate::services::{IdentityProvider, ImageStore, ProfileStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub images: Arc<dyn ImageStore>,
    pub search: PlayerSearch,
    pub latest: Arc<LatestResults>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(auth::configure)
            .configure(profile::configure)
            .configure(players::configure),
    );
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
