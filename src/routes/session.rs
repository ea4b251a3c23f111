use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::error::ApiError;
use crate::models::{Session, SessionIdentity};
use crate::routes::AppState;

pub const USER_HEADER: &str = "X-Rally-User";
pub const SESSION_HEADER: &str = "X-Rally-Session";

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The session is read once here and passed explicitly from then on
impl FromRequest for Session {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = header_value(req, USER_HEADER)
            .zip(header_value(req, SESSION_HEADER))
            .map(|(user_id, session_id)| Session { user_id, session_id });

        ready(session.ok_or(ApiError::Unauthenticated))
    }
}

/// Check that the session is still active with the identity provider
pub async fn authenticate(state: &AppState, session: &Session) -> Result<SessionIdentity, ApiError> {
    match state.identity.current_user(session).await? {
        Some(identity) if identity.user_id == session.user_id => Ok(identity),
        _ => {
            tracing::debug!("Rejected inactive session for {}", session.user_id);
            Err(ApiError::Unauthenticated)
        }
    }
}
