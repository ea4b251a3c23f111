use actix_web::{http::header, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{ImageUploadResponse, ProfileDraft, Session};
use crate::routes::session::authenticate;
use crate::routes::AppState;

/// Largest accepted profile picture
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile", web::get().to(get_profile))
        .route("/profile", web::put().to(update_profile))
        .service(
            web::resource("/profile/image")
                .app_data(web::PayloadConfig::new(MAX_IMAGE_BYTES))
                .route(web::put().to(upload_image)),
        );
}

/// GET /api/v1/profile
async fn get_profile(state: web::Data<AppState>, session: Session) -> Result<HttpResponse, ApiError> {
    let identity = authenticate(&state, &session).await?;

    let profile = state
        .profiles
        .get(&identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile for {}", identity.user_id)))?;

    Ok(HttpResponse::Ok().json(profile))
}

/// Replace the caller's profile with a validated draft
///
/// PUT /api/v1/profile
///
/// Request body:
/// ```json
/// {
///   "firstName": "string",
///   "email": "string",
///   "bio": "string",
///   "skillLevel": "Beginner|Intermediate|Advanced",
///   "rating": { "system": "utr|ntrp|none", "value": 4.5 },
///   "social": { "platform": "instagram|facebook|twitter|none", "handle": "string" },
///   "zipcode": "string"
/// }
/// ```
async fn update_profile(
    state: web::Data<AppState>,
    session: Session,
    draft: web::Json<ProfileDraft>,
) -> Result<HttpResponse, ApiError> {
    // Nothing is sent to the backend until the whole draft is valid
    draft.validate()?;

    let identity = authenticate(&state, &session).await?;

    let image_url = state
        .profiles
        .get(&identity.user_id)
        .await?
        .and_then(|existing| existing.image_url);

    let profile = draft.into_inner().into_profile(&identity.user_id, image_url);
    state.profiles.put(&profile).await?;

    tracing::info!("Updated profile for {}", identity.user_id);

    Ok(HttpResponse::Ok().json(profile))
}

/// Upload a new profile picture and point the profile at it.
/// The previous picture is removed only after the profile is updated.
///
/// PUT /api/v1/profile/image
async fn upload_image(
    state: web::Data<AppState>,
    session: Session,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if body.is_empty() {
        return Err(ApiError::BadRequest("Please choose an image to upload.".to_string()));
    }
    if !content_type.starts_with("image/") {
        return Err(ApiError::BadRequest("Profile pictures must be images.".to_string()));
    }

    let identity = authenticate(&state, &session).await?;

    let mut profile = state
        .profiles
        .get(&identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile for {}", identity.user_id)))?;

    let image_url = state
        .images
        .upload(&identity.user_id, body.to_vec(), &content_type)
        .await?;

    let previous = profile.image_url.replace(image_url.clone());

    if let Err(e) = state.profiles.put(&profile).await {
        // The profile still points at the old picture; drop the new file
        if let Err(cleanup) = state.images.delete(&image_url).await {
            tracing::warn!("Could not remove unused image {}: {}", image_url, cleanup);
        }
        return Err(e.into());
    }

    if let Some(old_url) = previous.filter(|old| *old != image_url) {
        if let Err(e) = state.images.delete(&old_url).await {
            tracing::warn!("Could not remove previous image {}: {}", old_url, e);
        }
    }

    Ok(HttpResponse::Ok().json(ImageUploadResponse { image_url }))
}
