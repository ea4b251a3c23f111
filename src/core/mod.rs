// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod latest;
pub mod search;
pub mod validation;

pub use distance::{distance_miles, haversine_meters, meters_to_miles, miles_to_meters, within_radius, METERS_PER_MILE};
pub use filters::{derive_ratings, distance_within, matches_skill_level};
pub use latest::{LatestResults, PublishedResults, SearchTicket};
pub use search::PlayerSearch;
pub use validation::{field_messages, validate_rating, validate_social};
