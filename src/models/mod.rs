// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{parse_rating, Distance, Geocoordinate, PlayerProfile, Rating, SearchCriteria, SearchResultEntry, Session, SessionIdentity, SkillLevel, Social, NTRP_RANGE, UTR_RANGE};
pub use requests::{LoginRequest, ProfileDraft, RegisterRequest, SearchRequest};
pub use responses::{ErrorResponse, HealthResponse, ImageUploadResponse, SearchResponse, SessionResponse};
