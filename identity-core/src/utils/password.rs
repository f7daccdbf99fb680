use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::KdfConfig;
use crate::services::ServiceError;

/// Newtype for password to prevent accidental logging
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Newtype for password hash
#[derive(Debug, Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Hash a password using Argon2id.
///
/// Work factors come from configuration; the salt is generated and embedded
/// in the PHC hash string.
pub fn hash_password(
    password: &Password,
    kdf: &KdfConfig,
) -> Result<PasswordHashString, ServiceError> {
    let params = Params::new(kdf.memory_kib, kdf.iterations, kdf.parallelism, None)
        .map_err(|e| ServiceError::Config(format!("invalid KDF parameters: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2
        .hash_password(password.as_str().as_bytes(), &salt)
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(PasswordHashString::new(password_hash))
}

/// Verify a password against a stored PHC hash.
///
/// Returns false for malformed hashes as well as mismatches; callers cannot
/// distinguish the two. Work factors are read back from the hash itself.
pub fn verify_password(password: &Password, password_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_str().as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_kdf() -> KdfConfig {
        KdfConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_hash_password() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hash_password(&password, &test_kdf()).expect("Failed to hash password");

        assert!(!hash.as_str().is_empty());
        assert!(hash.as_str().starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_password_correct() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hash_password(&password, &test_kdf()).expect("Failed to hash password");

        assert!(verify_password(&password, hash.as_str()));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hash_password(&password, &test_kdf()).expect("Failed to hash password");

        let wrong_password = Password::new("wrongPassword".to_string());
        assert!(!verify_password(&wrong_password, hash.as_str()));
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        let password = Password::new("mySecurePassword123".to_string());
        assert!(!verify_password(&password, "not-a-phc-string"));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash1 = hash_password(&password, &test_kdf()).expect("Failed to hash password");
        let hash2 = hash_password(&password, &test_kdf()).expect("Failed to hash password");

        // Random salt, so the hashes differ but both verify.
        assert_ne!(hash1.as_str(), hash2.as_str());
        assert!(verify_password(&password, hash1.as_str()));
        assert!(verify_password(&password, hash2.as_str()));
    }

    #[test]
    fn test_configured_work_factors_are_embedded() {
        let password = Password::new("pw".to_string());
        let kdf = KdfConfig {
            memory_kib: 16,
            iterations: 3,
            parallelism: 1,
        };
        let hash = hash_password(&password, &kdf).expect("Failed to hash password");

        assert!(hash.as_str().contains("m=16,t=3,p=1"));
        assert!(verify_password(&password, hash.as_str()));
    }
}
