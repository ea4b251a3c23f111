//! Rally Up - player matching service for a tennis community
//!
//! Players register, keep a profile (skill level, rating, social handle, photo)
//! and search for nearby hitting partners by skill and radius. Accounts,
//! documents and images live in Appwrite; postal codes are resolved through a
//! Zippopotam-style geocoding API.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{distance::distance_miles, LatestResults, PlayerSearch};
pub use error::ApiError;
pub use models::{Distance, Geocoordinate, PlayerProfile, ProfileDraft, Rating, SearchCriteria, SearchResultEntry, Session, SkillLevel, Social};
pub use services::{Geocoder, ZippopotamClient};
