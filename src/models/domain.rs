use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Self-reported playing level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Exact string stored on the profile document
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UTR ratings run from 1 to 16.5
pub const UTR_RANGE: (f64, f64) = (1.0, 16.5);
/// NTRP ratings run from 1 to 7
pub const NTRP_RANGE: (f64, f64) = (1.0, 7.0);

/// Rating paired with the system it was measured in
///
/// Reads `{"system": "utr", "value": 4.5}`. The value may also be a string,
/// and a blank, missing or non-numeric value reads as NaN so range
/// validation can reject it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "system", content = "value", rename_all = "lowercase")]
pub enum Rating {
    #[default]
    None,
    Utr(f64),
    Ntrp(f64),
}

impl Rating {
    /// Build from the stored `ratingType` / `rating` pair.
    ///
    /// A non-numeric value becomes NaN rather than failing, so legacy
    /// documents never break a read.
    pub fn from_parts(rating_type: &str, value: &str) -> Self {
        match rating_type {
            "utr" => Rating::Utr(parse_rating(value)),
            "ntrp" => Rating::Ntrp(parse_rating(value)),
            _ => Rating::None,
        }
    }

    /// The `(ratingType, rating)` pair written to the store
    pub fn to_parts(&self) -> (&'static str, String) {
        match self {
            Rating::None => ("none", String::new()),
            Rating::Utr(v) => ("utr", v.to_string()),
            Rating::Ntrp(v) => ("ntrp", v.to_string()),
        }
    }

    pub fn system_label(&self) -> Option<&'static str> {
        match self {
            Rating::None => None,
            Rating::Utr(_) => Some("UTR"),
            Rating::Ntrp(_) => Some("NTRP"),
        }
    }

    /// Whether the value lies inside its system's range
    pub fn is_in_range(&self) -> bool {
        match *self {
            Rating::None => true,
            Rating::Utr(v) => v >= UTR_RANGE.0 && v <= UTR_RANGE.1,
            Rating::Ntrp(v) => v >= NTRP_RANGE.0 && v <= NTRP_RANGE.1,
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Tagged {
            system: String,
            #[serde(default)]
            value: serde_json::Value,
        }

        let tagged = Tagged::deserialize(deserializer)?;
        let value = match &tagged.value {
            serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            serde_json::Value::String(s) => parse_rating(s),
            _ => f64::NAN,
        };

        match tagged.system.as_str() {
            "none" => Ok(Rating::None),
            "utr" => Ok(Rating::Utr(value)),
            "ntrp" => Ok(Rating::Ntrp(value)),
            other => Err(de::Error::unknown_variant(other, &["none", "utr", "ntrp"])),
        }
    }
}

/// Parse a stored rating string, yielding NaN when it isn't a number
pub fn parse_rating(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Social handle paired with its platform
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "platform", content = "handle", rename_all = "lowercase")]
pub enum Social {
    #[default]
    None,
    Instagram(String),
    Facebook(String),
    Twitter(String),
}

impl Social {
    /// Build from the stored `socialType` / `social` pair.
    /// Either half missing means no social link.
    pub fn from_parts(social_type: &str, handle: &str) -> Self {
        let handle = handle.trim();
        if handle.is_empty() {
            return Social::None;
        }
        match social_type {
            "insta" | "instagram" => Social::Instagram(handle.to_string()),
            "fb" | "facebook" => Social::Facebook(handle.to_string()),
            "twitter" => Social::Twitter(handle.to_string()),
            _ => Social::None,
        }
    }

    /// The `(socialType, social)` pair written to the store
    pub fn to_parts(&self) -> (&'static str, String) {
        match self {
            Social::None => ("none", String::new()),
            Social::Instagram(h) => ("insta", h.clone()),
            Social::Facebook(h) => ("fb", h.clone()),
            Social::Twitter(h) => ("twitter", h.clone()),
        }
    }

    pub fn handle(&self) -> Option<&str> {
        match self {
            Social::None => None,
            Social::Instagram(h) | Social::Facebook(h) | Social::Twitter(h) => Some(h),
        }
    }

    /// Public profile link for the handle
    pub fn profile_url(&self) -> Option<String> {
        match self {
            Social::None => None,
            Social::Instagram(h) => Some(format!("https://instagram.com/{}", h)),
            Social::Facebook(h) => Some(format!("https://facebook.com/{}", h)),
            Social::Twitter(h) => Some(format!("https://twitter.com/{}", h)),
        }
    }
}

/// Player profile document as stored in the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(rename = "$id", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "firstName", default, deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bio: String,
    #[serde(rename = "skillLevel", default, deserialize_with = "lenient_string")]
    pub skill_level: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rating: String,
    #[serde(rename = "ratingType", default, deserialize_with = "lenient_string")]
    pub rating_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub social: String,
    #[serde(rename = "socialType", default, deserialize_with = "lenient_string")]
    pub social_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub zipcode: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

impl PlayerProfile {
    /// Profile written at registration: name, email and skill level only
    pub fn registered(id: &str, first_name: &str, email: &str, skill_level: SkillLevel) -> Self {
        Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            email: email.to_string(),
            skill_level: skill_level.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn rating(&self) -> Rating {
        Rating::from_parts(&self.rating_type, &self.rating)
    }

    pub fn social_link(&self) -> Social {
        Social::from_parts(&self.social_type, &self.social)
    }

    /// Document body for the backend, without the `$id` key
    pub fn document_data(&self) -> serde_json::Value {
        let mut data = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = data.as_object_mut() {
            obj.remove("$id");
        }
        data
    }
}

/// Accepts strings, numbers, booleans and null for a string field
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Resolved location of a postal code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geocoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
}

/// Per-search filter criteria
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(rename = "skillLevel")]
    pub skill_level: Option<SkillLevel>,
    #[serde(rename = "originPostalCode")]
    pub origin_postal_code: Option<String>,
    #[serde(rename = "radiusMiles")]
    pub radius_miles: Option<f64>,
}

impl SearchCriteria {
    /// Origin and radius, when both are supplied.
    /// A blank origin counts as missing; a radius of zero does not.
    /// The origin is passed on exactly as given.
    pub fn distance_filter(&self) -> Option<(&str, f64)> {
        let origin = self.origin_postal_code.as_deref()?;
        if origin.trim().is_empty() {
            return None;
        }
        self.radius_miles.map(|radius| (origin, radius))
    }
}

/// Distance from the search origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distance {
    Miles(u64),
    #[default]
    Unknown,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Miles(m) => write!(f, "{}", m),
            Distance::Unknown => f.write_str("?"),
        }
    }
}

impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Distance::Miles(m) => serializer.serialize_u64(*m),
            Distance::Unknown => serializer.serialize_str("?"),
        }
    }
}

/// A player annotated for display in search results
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultEntry {
    #[serde(flatten)]
    pub profile: PlayerProfile,
    pub location: Option<Geocoordinate>,
    pub distance: Distance,
    pub utr: Option<f64>,
    pub ntrp: Option<f64>,
    #[serde(rename = "socialUrl")]
    pub social_url: Option<String>,
    #[serde(rename = "locationLabel")]
    pub location_label: String,
}

impl SearchResultEntry {
    pub fn new(profile: PlayerProfile, location: Option<Geocoordinate>) -> Self {
        let (utr, ntrp) = crate::core::filters::derive_ratings(&profile);
        let social_url = profile.social_link().profile_url();
        let mut entry = Self {
            profile,
            location,
            distance: Distance::Unknown,
            utr,
            ntrp,
            social_url,
            location_label: String::new(),
        };
        entry.location_label = entry.describe_location();
        entry
    }

    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self.location_label = self.describe_location();
        self
    }

    fn describe_location(&self) -> String {
        match &self.location {
            Some(loc) => format!("{}, {} ({} mi)", loc.city, loc.state, self.distance),
            None => "Unknown location".to_string(),
        }
    }
}

/// Active session handed to every operation that acts for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Identity behind a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub name: String,
}
