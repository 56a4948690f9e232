/// Password Hashing and Verification
///
/// bcrypt with the library's default cost. Plaintext never leaves this module.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

/// bcrypt only reads the first 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns a validation error for empty or over-long passwords, or an
/// internal error if bcrypt itself fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    validate_password(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored hash.
///
/// A malformed stored hash is a mismatch, not an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be checked");
            false
        }
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()).into());
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(
            ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES).into(),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "secret123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hash1 = hash_password("secret123").unwrap();
        let hash2 = hash_password("secret123").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("secret123", &hash1));
        assert!(verify_password("secret123", &hash2));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("secret123").expect("Failed to hash password");

        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("secret123", "not-a-bcrypt-hash"));
        assert!(!verify_password("secret123", ""));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(
            hash_password(""),
            Err(AppError::Validation(ValidationError::EmptyField(_)))
        ));
    }

    #[test]
    fn test_too_long_password_rejected() {
        let long_password = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(hash_password(&long_password).is_err());
    }
}
