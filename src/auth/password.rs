//! Password hashing and verification with Argon2.

use anyhow::{Result, anyhow};
use argon2::password_hash::rand_core::OsRng;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};

/// Salted one-way hashing of user passwords
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
    /// Verified against when no user matched, so a miss costs as much as a hit
    dummy_hash: String,
}

impl PasswordService {
    pub fn new() -> Result<Self> {
        let argon2 = Argon2::default();
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(salt.as_str().as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to prepare dummy password hash: {}", e))?
            .to_string();
        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a password into a PHC string
    pub fn hash(&self, plain: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash; malformed hashes never match
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Burn the same effort as `verify` for a lookup that found nobody
    pub fn verify_missing(&self, plain: &str) -> bool {
        let _ = self.verify(plain, &self.dummy_hash);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::new().unwrap();
        let hash = service.hash("secret1").unwrap();

        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2"));
        assert!(service.verify("secret1", &hash));
        assert!(!service.verify("secret2", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = PasswordService::new().unwrap();
        let first = service.hash("secret1").unwrap();
        let second = service.hash("secret1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let service = PasswordService::new().unwrap();
        assert!(!service.verify("secret1", "plaintext-in-the-db"));
        assert!(!service.verify_missing("secret1"));
    }
}
