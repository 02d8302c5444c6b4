//! Password value object - Argon2 hashing and verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Well-formed hash that never verifies. Login checks unknown emails
/// against it so both branches pay the Argon2 cost.
const UNMATCHABLE_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c3RvcmVmcm9udHNhbHQ$3kVXy6ytJ0IZ0LnzM8hB2lIzNnXMQwIHTr9Ohn0Rd0A";

/// Hashed password as stored on the user row.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plain-text password after checking the length rule.
    ///
    /// # Errors
    /// Returns a validation error if the password is shorter than
    /// `MIN_PASSWORD_LENGTH`.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Wrap an existing hash loaded from the database.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Placeholder used when no account matches a login attempt.
    pub fn unmatchable() -> Self {
        Self::from_hash(UNMATCHABLE_HASH.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain-text password. Malformed hashes never verify.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = Password::new("CorrectHorse9").unwrap();
        assert!(password.verify("CorrectHorse9"));
        assert!(!password.verify("WrongHorse9"));
    }

    #[test]
    fn test_restored_hash_still_verifies() {
        let password = Password::new("Basket-Of-Eggs").unwrap();
        let restored = Password::from_hash(password.as_str().to_string());
        assert!(restored.verify("Basket-Of-Eggs"));
    }

    #[test]
    fn test_salts_differ() {
        let first = Password::new("SameSecret1").unwrap();
        let second = Password::new("SameSecret1").unwrap();
        assert_ne!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_length_rule() {
        assert!(Password::new("short").is_err());
        assert!(Password::new("12345678").is_ok());
    }

    #[test]
    fn test_unmatchable_never_verifies() {
        let placeholder = Password::unmatchable();
        assert!(!placeholder.verify(""));
        assert!(!placeholder.verify("anything-at-all"));
    }

    #[test]
    fn test_debug_hides_hash() {
        let password = Password::new("DebugMe1234").unwrap();
        assert!(!format!("{:?}", password).contains("argon2"));
    }
}
