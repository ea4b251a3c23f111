use crate::core::distance::{distance_miles, within_radius};
use crate::models::{parse_rating, Geocoordinate, PlayerProfile, SkillLevel};

/// Exact, case-sensitive skill level match. No filter keeps everyone.
#[inline]
pub fn matches_skill_level(profile: &PlayerProfile, skill_level: Option<SkillLevel>) -> bool {
    match skill_level {
        Some(level) => profile.skill_level == level.as_str(),
        None => true,
    }
}

/// Split the stored rating into `(utr, ntrp)` by its rating-system tag.
///
/// A non-numeric rating comes back as NaN; any other tag yields `(None, None)`.
#[inline]
pub fn derive_ratings(profile: &PlayerProfile) -> (Option<f64>, Option<f64>) {
    match profile.rating_type.as_str() {
        "utr" => (Some(parse_rating(&profile.rating)), None),
        "ntrp" => (None, Some(parse_rating(&profile.rating))),
        _ => (None, None),
    }
}

/// Distance in miles from `origin` when `location` lies inside the radius
#[inline]
pub fn distance_within(
    origin: &Geocoordinate,
    location: &Geocoordinate,
    radius_miles: f64,
) -> Option<f64> {
    let miles = distance_miles(origin, location);
    within_radius(miles, radius_miles).then_some(miles)
}
