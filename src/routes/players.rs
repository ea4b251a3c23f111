use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{SearchCriteria, SearchRequest, SearchResponse, Session};
use crate::routes::session::authenticate;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/players/search", web::post().to(search_players))
        .route("/players/search/latest", web::get().to(latest_search));
}

/// Player search endpoint
///
/// POST /api/v1/players/search
///
/// Request body:
/// ```json
/// {
///   "skillLevel": "Beginner|Intermediate|Advanced",
///   "zipcode": "string",
///   "radiusMiles": 10
/// }
/// ```
async fn search_players(
    state: web::Data<AppState>,
    session: Session,
    req: web::Json<SearchRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let identity = authenticate(&state, &session).await?;
    let criteria = SearchCriteria::from(req.into_inner());

    let ticket = state.latest.begin(&identity.user_id).await;

    let roster = match criteria.skill_level {
        Some(level) => state.profiles.query_by_skill_level(level).await?,
        None => state.profiles.query_all().await?,
    };

    tracing::info!(
        "Searching {} players for {} (skill: {:?}, origin: {:?}, radius: {:?})",
        roster.len(),
        identity.user_id,
        criteria.skill_level,
        criteria.origin_postal_code,
        criteria.radius_miles
    );

    let entries = Arc::new(state.search.search(roster, &criteria).await);
    let total_results = entries.len();

    let published = state
        .latest
        .publish(&ticket, criteria, Arc::clone(&entries))
        .await;

    if !published {
        tracing::info!(
            "Search {} for {} was superseded, discarding {} results",
            ticket.generation(),
            identity.user_id,
            total_results
        );
        return Ok(HttpResponse::Ok().json(SearchResponse {
            players: Arc::new(Vec::new()),
            total_results: 0,
            superseded: true,
        }));
    }

    Ok(HttpResponse::Ok().json(SearchResponse {
        players: entries,
        total_results,
        superseded: false,
    }))
}

/// Most recent completed search for the caller
///
/// GET /api/v1/players/search/latest
async fn latest_search(state: web::Data<AppState>, session: Session) -> Result<HttpResponse, ApiError> {
    let identity = authenticate(&state, &session).await?;

    let latest = state
        .latest
        .latest(&identity.user_id)
        .await
        .ok_or_else(|| ApiError::NotFound("No search results yet".to_string()))?;

    Ok(HttpResponse::Ok().json(SearchResponse {
        total_results: latest.entries.len(),
        players: latest.entries,
        superseded: false,
    }))
}
