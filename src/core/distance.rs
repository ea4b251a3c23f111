use geo::{HaversineDistance, Point};

use crate::models::Geocoordinate;

/// Meters in one statute mile
pub const METERS_PER_MILE: f64 = 1609.34;

/// Calculate the Haversine distance between two points in meters
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = Point::new(lon1, lat1);
    let b = Point::new(lon2, lat2);
    a.haversine_distance(&b)
}

/// Great-circle distance between two resolved locations, in miles
#[inline]
pub fn distance_miles(a: &Geocoordinate, b: &Geocoordinate) -> f64 {
    meters_to_miles(haversine_meters(a.latitude, a.longitude, b.latitude, b.longitude))
}

#[inline]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

#[inline]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

/// Inclusive radius check; a radius of zero only admits co-located points
#[inline]
pub fn within_radius(distance_miles: f64, radius_miles: f64) -> bool {
    distance_miles <= radius_miles
}
