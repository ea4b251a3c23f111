use std::borrow::Cow;
use std::collections::HashMap;

use validator::{ValidateEmail, ValidationError, ValidationErrors};

use crate::models::{Rating, Social};

/// Reject ratings outside their system's conventional range
/// (UTR 1 to 16.5, NTRP 1 to 7)
pub fn validate_rating(rating: &Rating) -> Result<(), ValidationError> {
    if rating.is_in_range() {
        return Ok(());
    }

    let system = rating.system_label().unwrap_or("rating");
    let mut err = ValidationError::new("rating_range");
    err.message = Some(Cow::Owned(format!("Please enter a valid {} rating.", system)));
    Err(err)
}

/// A chosen platform needs a handle
pub fn validate_social(social: &Social) -> Result<(), ValidationError> {
    match social.handle() {
        Some(handle) if handle.trim().is_empty() => {
            let mut err = ValidationError::new("social_handle");
            err.message = Some(Cow::Borrowed("Please enter a username for the selected social."));
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Sign-up email: blank means the form is incomplete, otherwise it must look like an address
pub fn validate_signup_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed("All fields are required."));
        return Err(err);
    }
    if !email.validate_email() {
        let mut err = ValidationError::new("email");
        err.message = Some(Cow::Borrowed("Please enter a valid email."));
        return Err(err);
    }
    Ok(())
}

/// Flatten validator output into field -> messages
pub fn field_messages(errors: &ValidationErrors) -> HashMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProfileDraft, SkillLevel};
    use validator::Validate;

    fn draft(rating: Rating) -> ProfileDraft {
        ProfileDraft {
            first_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            bio: String::new(),
            skill_level: SkillLevel::Advanced,
            rating,
            social: Social::None,
            zipcode: "10001".to_string(),
        }
    }

    #[test]
    fn test_utr_bounds() {
        assert!(validate_rating(&Rating::Utr(1.0)).is_ok());
        assert!(validate_rating(&Rating::Utr(16.5)).is_ok());
        assert!(validate_rating(&Rating::Utr(0.9)).is_err());
        assert!(validate_rating(&Rating::Utr(17.0)).is_err());
    }

    #[test]
    fn test_ntrp_bounds() {
        assert!(validate_rating(&Rating::Ntrp(7.0)).is_ok());
        assert!(validate_rating(&Rating::Ntrp(7.5)).is_err());
        assert!(validate_rating(&Rating::Ntrp(f64::NAN)).is_err());
    }

    #[test]
    fn test_rating_message_names_system() {
        let err = validate_rating(&Rating::Ntrp(9.0)).unwrap_err();
        assert_eq!(err.message.unwrap(), "Please enter a valid NTRP rating.");
    }

    #[test]
    fn test_draft_rejects_out_of_range_rating() {
        let errors = draft(Rating::Utr(20.0)).validate().unwrap_err();
        let messages = field_messages(&errors);
        let all: Vec<&String> = messages.values().flatten().collect();
        assert_eq!(all, vec!["Please enter a valid UTR rating."]);
    }

    #[test]
    fn test_draft_accepts_no_rating() {
        assert!(draft(Rating::None).validate().is_ok());
    }

    #[test]
    fn test_social_needs_handle() {
        assert!(validate_social(&Social::Instagram("  ".to_string())).is_err());
        assert!(validate_social(&Social::Instagram("ana".to_string())).is_ok());
        assert!(validate_social(&Social::None).is_ok());
    }
}
