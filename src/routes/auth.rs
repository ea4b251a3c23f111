use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{LoginRequest, PlayerProfile, RegisterRequest, Session, SessionResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/register", web::post().to(register))
        .route("/auth/login", web::post().to(login))
        .route("/auth/logout", web::post().to(logout));
}

/// Register endpoint
///
/// POST /api/v1/auth/register
///
/// Request body:
/// ```json
/// {
///   "email": "string",
///   "password": "string",
///   "firstName": "string",
///   "skillLevel": "Beginner|Intermediate|Advanced"
/// }
/// ```
async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();
    // validated above
    let Some(skill_level) = req.skill_level else {
        return Err(ApiError::BadRequest("All fields are required.".to_string()));
    };

    let identity = state
        .identity
        .register(&req.email, &req.password, &req.first_name)
        .await?;

    // The account already exists at this point. If the profile write fails the
    // account stays without a profile and a retry reports the email as taken.
    let profile = PlayerProfile::registered(&identity.user_id, &req.first_name, &req.email, skill_level);
    if let Err(e) = state.profiles.put(&profile).await {
        tracing::error!(
            "Account {} ({}) was created but its profile could not be stored: {}",
            identity.user_id,
            req.email,
            e
        );
        return Err(e.into());
    }

    let session = state.identity.login(&req.email, &req.password).await?;

    tracing::info!("Registered player {} ({})", session.user_id, skill_level);

    Ok(HttpResponse::Created().json(SessionResponse {
        user_id: session.user_id,
        session_id: session.session_id,
    }))
}

/// Login endpoint
///
/// POST /api/v1/auth/login
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let session = state.identity.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(SessionResponse {
        user_id: session.user_id,
        session_id: session.session_id,
    }))
}

/// Logout endpoint
///
/// POST /api/v1/auth/logout
async fn logout(state: web::Data<AppState>, session: Session) -> Result<HttpResponse, ApiError> {
    state.identity.logout(&session).await?;
    state.latest.clear(&session.user_id).await;

    tracing::debug!("Logged out {}", session.user_id);

    Ok(HttpResponse::NoContent().finish())
}
