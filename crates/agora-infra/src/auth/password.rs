//! Argon2id password hashes in PHC string form.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};

use agora_core::ports::{AuthError, PasswordService};

#[derive(Default)]
pub struct Argon2PasswordService {
    hasher: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(phc.to_string())
    }

    /// `Ok(false)` for a wrong password; an unreadable stored hash is an error.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let stored = PasswordHash::new(hash)
            .map_err(|e| AuthError::HashingError(format!("stored hash unreadable: {e}")))?;

        match self.hasher.verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(e) => Err(AuthError::HashingError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matches_only_original_password() {
        let passwords = Argon2PasswordService::new();
        let hash = passwords.hash("correct horse battery staple").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify("correct horse battery staple", &hash).unwrap());
        assert!(!passwords.verify("Correct horse battery staple", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let passwords = Argon2PasswordService::new();
        assert_ne!(
            passwords.hash("hunter22").unwrap(),
            passwords.hash("hunter22").unwrap()
        );
    }

    #[test]
    fn test_unreadable_hash_is_an_error() {
        let passwords = Argon2PasswordService::new();
        assert!(matches!(
            passwords.verify("anything", "plaintext-in-the-db"),
            Err(AuthError::HashingError(_))
        ));
    }
}
