/// Input validators for request fields that reach the store
/// 1. Email shape and length
/// 2. Post body length

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
pub const MAX_POST_LENGTH: usize = 140;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates an email address and returns it trimmed.
///
/// Case is preserved; lookups are case-sensitive.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a post body: non-empty and at most 140 characters
pub fn is_valid_post_body(body: &str) -> Result<&str, ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyField("body".to_string()));
    }

    if body.chars().count() > MAX_POST_LENGTH {
        return Err(ValidationError::TooLong("body".to_string(), MAX_POST_LENGTH));
    }

    Ok(body)
}
