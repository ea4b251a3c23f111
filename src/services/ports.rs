//! Boundaries to the backend-as-a-service platform.
//!
//! The search pipeline never calls these; the HTTP layer does, and hands
//! the pipeline a roster it has already fetched.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{PlayerProfile, Session, SessionIdentity, SkillLevel};

/// Failures surfaced by the external collaborators
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected credentials or registration; the message is shown verbatim
    #[error("{0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Sign-up, login and session state
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn register(&self, email: &str, password: &str, name: &str) -> Result<SessionIdentity, ServiceError>;

    async fn login(&self, email: &str, password: &str) -> Result<Session, ServiceError>;

    async fn logout(&self, session: &Session) -> Result<(), ServiceError>;

    /// Identity behind a session, or `None` when the session is not active
    async fn current_user(&self, session: &Session) -> Result<Option<SessionIdentity>, ServiceError>;
}

/// Player profile persistence
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<PlayerProfile>, ServiceError>;

    /// Create or replace the profile stored under `profile.id`
    async fn put(&self, profile: &PlayerProfile) -> Result<(), ServiceError>;

    async fn query_all(&self) -> Result<Vec<PlayerProfile>, ServiceError>;

    async fn query_by_skill_level(&self, level: SkillLevel) -> Result<Vec<PlayerProfile>, ServiceError>;
}

/// Binary storage for profile pictures
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` as a new file for `key` and return its public URL.
    /// Earlier files are left in place.
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, ServiceError>;

    /// Remove a file previously returned by `upload`
    async fn delete(&self, url: &str) -> Result<(), ServiceError>;
}
