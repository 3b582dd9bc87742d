//! Argon2id password hashing for reporter and admin accounts.

use std::env;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use lexleaks_core::ports::{AuthError, PasswordService};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHashConfig {
    /// Read `PASSWORD_HASH_MEMORY_KIB`, `PASSWORD_HASH_ITERATIONS` and
    /// `PASSWORD_HASH_PARALLELISM`, keeping the Argon2 defaults for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |key: &str, default: u32| {
            env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        Self {
            memory_kib: read("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib),
            iterations: read("PASSWORD_HASH_ITERATIONS", defaults.iterations),
            parallelism: read("PASSWORD_HASH_PARALLELISM", defaults.parallelism),
        }
    }
}

/// Hashes into PHC strings with a fresh salt each time. Verification reads
/// the parameters embedded in the stored hash, so raising the cost does not
/// lock out existing accounts.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Build with explicit costs. Out-of-range values fall back to the
    /// Argon2 defaults with a warning.
    pub fn with_config(config: PasswordHashConfig) -> Self {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, ?config, "Invalid Argon2 parameters, using defaults");
                Params::default()
            });
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn from_env() -> Self {
        Self::with_config(PasswordHashConfig::from_env())
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let stored = PasswordHash::new(hash).map_err(|e| {
            tracing::error!(error = %e, "Stored password hash is not a PHC string");
            AuthError::HashingError(e.to_string())
        })?;

        match self.argon2.verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::HashingError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2PasswordService {
        Argon2PasswordService::with_config(PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_hash_and_verify() {
        let service = cheap();
        let password = "whistle-blower-42";

        let hash = service.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify(password, &hash).unwrap());
        assert!(!service.verify("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let service = cheap();

        let first = service.hash("whistle-blower-42").unwrap();
        let second = service.hash("whistle-blower-42").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_from_other_costs_still_verifies() {
        let hash = cheap().hash("whistle-blower-42").unwrap();

        assert!(Argon2PasswordService::new().verify("whistle-blower-42", &hash).unwrap());
    }

    #[test]
    fn test_invalid_costs_fall_back_to_defaults() {
        let service = Argon2PasswordService::with_config(PasswordHashConfig {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });

        let hash = service.hash("whistle-blower-42").unwrap();
        assert!(service.verify("whistle-blower-42", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            cheap().verify("anything", "not-a-phc-string"),
            Err(AuthError::HashingError(_))
        ));
    }
}
