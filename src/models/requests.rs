use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::core::validation::{validate_rating, validate_signup_email, validate_social};
use crate::models::domain::{PlayerProfile, Rating, SearchCriteria, SkillLevel, Social};

/// Request to create an account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_signup_email"))]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "All fields are required."))]
    #[serde(default)]
    pub password: String,
    #[validate(length(min = 1, message = "All fields are required."))]
    #[serde(alias = "first_name", rename = "firstName", default)]
    pub first_name: String,
    #[validate(required(message = "All fields are required."))]
    #[serde(alias = "skill_level", rename = "skillLevel", default, deserialize_with = "blank_as_none")]
    pub skill_level: Option<SkillLevel>,
}

/// Request to open a session
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Please enter your email."))]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter your password."))]
    #[serde(default)]
    pub password: String,
}

/// Complete edited profile, replaced wholesale on every edit and
/// validated as one unit before it is written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfileDraft {
    #[validate(length(min = 1, message = "Please enter your first name."))]
    #[serde(alias = "first_name", rename = "firstName")]
    pub first_name: String,
    #[validate(email(message = "Please enter a valid email."))]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(alias = "skill_level", rename = "skillLevel")]
    pub skill_level: SkillLevel,
    #[validate(custom(function = "validate_rating"))]
    #[serde(default)]
    pub rating: Rating,
    #[validate(custom(function = "validate_social"))]
    #[serde(default)]
    pub social: Social,
    #[serde(default)]
    pub zipcode: String,
}

impl ProfileDraft {
    /// Draft pre-filled from a stored profile
    pub fn from_profile(profile: &PlayerProfile) -> Option<Self> {
        let skill_level = match profile.skill_level.as_str() {
            "Beginner" => SkillLevel::Beginner,
            "Intermediate" => SkillLevel::Intermediate,
            "Advanced" => SkillLevel::Advanced,
            _ => return None,
        };
        Some(Self {
            first_name: profile.first_name.clone(),
            email: profile.email.clone(),
            bio: profile.bio.clone(),
            skill_level,
            rating: profile.rating(),
            social: profile.social_link(),
            zipcode: profile.zipcode.clone(),
        })
    }

    /// Stored form of this draft for the given user, keeping the image URL
    pub fn into_profile(self, id: &str, image_url: Option<String>) -> PlayerProfile {
        let (rating_type, rating) = self.rating.to_parts();
        let (social_type, social) = self.social.to_parts();
        PlayerProfile {
            id: id.to_string(),
            first_name: self.first_name.trim().to_string(),
            email: self.email.trim().to_string(),
            bio: self.bio,
            skill_level: self.skill_level.as_str().to_string(),
            rating,
            rating_type: rating_type.to_string(),
            social,
            social_type: social_type.to_string(),
            zipcode: self.zipcode,
            image_url,
        }
    }
}

/// Request to search the roster
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[serde(alias = "skill_level", rename = "skillLevel", default, deserialize_with = "blank_as_none")]
    pub skill_level: Option<SkillLevel>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[validate(range(min = 0.0, message = "Radius must not be negative."))]
    #[serde(alias = "radius", rename = "radiusMiles", default)]
    pub radius_miles: Option<f64>,
}

impl From<SearchRequest> for SearchCriteria {
    fn from(req: SearchRequest) -> Self {
        SearchCriteria {
            skill_level: req.skill_level,
            origin_postal_code: req.zipcode,
            radius_miles: req.radius_miles,
        }
    }
}

/// Treats `""` the same as a missing value ("Any" in a select box)
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<SkillLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(level) => SkillLevel::deserialize(level.into_deserializer()).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_blank_skill_is_any() {
        let req: SearchRequest =
            serde_json::from_value(serde_json::json!({ "skillLevel": "", "zipcode": "10001" })).unwrap();
        assert!(req.skill_level.is_none());
        assert_eq!(req.zipcode.as_deref(), Some("10001"));
    }

    #[test]
    fn test_search_request_skill_is_case_sensitive() {
        let res: Result<SearchRequest, _> =
            serde_json::from_value(serde_json::json!({ "skillLevel": "advanced" }));
        assert!(res.is_err());
    }

    #[test]
    fn test_register_requires_every_field() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "ana@example.com",
            "password": "secret1",
            "firstName": ""
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 2);
        assert!(!fields.contains_key("email"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn test_register_blank_email_is_required_not_malformed() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "",
            "password": "secret1",
            "firstName": "Ana",
            "skillLevel": "Beginner"
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = crate::core::validation::field_messages(&errors);
        assert_eq!(fields["email"], vec!["All fields are required.".to_string()]);

        let req = RegisterRequest { email: "ana@".to_string(), ..req };
        let fields = crate::core::validation::field_messages(&req.validate().unwrap_err());
        assert_eq!(fields["email"], vec!["Please enter a valid email.".to_string()]);
    }

    #[test]
    fn test_login_messages_are_readable() {
        let req = LoginRequest {
            email: String::new(),
            password: String::new(),
        };

        let fields = crate::core::validation::field_messages(&req.validate().unwrap_err());
        assert_eq!(fields["email"], vec!["Please enter your email.".to_string()]);
        assert_eq!(fields["password"], vec!["Please enter your password.".to_string()]);
    }

    #[test]
    fn test_draft_into_profile_writes_tag_pairs() {
        let draft = ProfileDraft {
            first_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            bio: "Weekday mornings".to_string(),
            skill_level: SkillLevel::Intermediate,
            rating: Rating::Utr(6.25),
            social: Social::Twitter("ana_hits".to_string()),
            zipcode: "10001".to_string(),
        };

        let profile = draft.into_profile("u1", Some("https://img/u1".to_string()));
        assert_eq!(profile.rating_type, "utr");
        assert_eq!(profile.rating, "6.25");
        assert_eq!(profile.social_type, "twitter");
        assert_eq!(profile.social, "ana_hits");
        assert_eq!(profile.zipcode, "10001");
        assert_eq!(profile.image_url.as_deref(), Some("https://img/u1"));
    }

    #[test]
    fn test_draft_from_profile_requires_known_skill() {
        let mut profile = PlayerProfile::registered("u1", "Ana", "ana@example.com", SkillLevel::Advanced);
        assert!(ProfileDraft::from_profile(&profile).is_some());

        profile.skill_level = String::new();
        assert!(ProfileDraft::from_profile(&profile).is_none());
    }
}
