use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Stateless Argon2id hasher. Cheap to clone, built once from config and
/// handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(cfg: HashingConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {}", e))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Produces a PHC string (`$argon2id$v=19$m=...`). The whole input is
    /// hashed, nothing is truncated.
    pub fn hash_password(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Parameters are taken from the hash itself, so hashes made with older
    /// cost settings keep verifying.
    pub fn verify_password(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "argon2 parse hash error");
                return false;
            }
        };
        self.argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(HashingConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap params are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = test_hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash_password(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = test_hasher();
        let hash = hasher
            .hash_password("correct-horse-battery-staple")
            .expect("hashing should succeed");
        assert!(!hasher.verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_is_false_on_malformed_hash() {
        let hasher = test_hasher();
        assert!(!hasher.verify_password("anything", "not-a-valid-hash"));
        assert!(!hasher.verify_password("anything", ""));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = test_hasher();
        let a = hasher.hash_password("same-password").unwrap();
        let b = hasher.hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn long_passwords_are_not_truncated() {
        let hasher = test_hasher();
        let base = "x".repeat(100);
        let hash = hasher.hash_password(&format!("{base}A")).unwrap();
        assert!(!hasher.verify_password(&format!("{base}B"), &hash));
        assert!(hasher.verify_password(&format!("{base}A"), &hash));
    }

    #[test]
    fn verifies_hash_made_with_other_params() {
        let strong = PasswordHasher::new(HashingConfig {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = strong.hash_password("secret1").unwrap();
        assert!(test_hasher().verify_password("secret1", &hash));
    }

    #[test]
    fn rejects_invalid_params() {
        let err = PasswordHasher::new(HashingConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(err.is_err());
    }
}
