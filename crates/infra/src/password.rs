//! Password hashing implementation (PBKDF2-HMAC-SHA256).
//!
//! The stored string is self-describing:
//! `pbkdf2-sha256$<iterations>$<salt hex>$<derived key hex>`, so iteration
//! counts can be raised later without invalidating existing hashes.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use storefront_auth::PasswordHasher;

const SCHEME: &str = "pbkdf2-sha256";
const KEY_LEN: usize = 32;

/// Default iteration count for new hashes.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// PBKDF2-HMAC-SHA256 password hasher.
#[derive(Debug, Clone)]
pub struct Pbkdf2PasswordHasher {
    iterations: u32,
}

impl Pbkdf2PasswordHasher {
    pub fn new() -> Self {
        Self::with_iterations(DEFAULT_ITERATIONS)
    }

    /// Lower iteration counts are for tests only.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }
}

impl Default for Pbkdf2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Pbkdf2PasswordHasher {
    fn hash(&self, password: &str) -> String {
        let salt = fresh_salt();
        let key = pbkdf2_sha256(password.as_bytes(), &salt, self.iterations);
        format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(key)
        )
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.split('$');
        let (Some(scheme), Some(iterations), Some(salt), Some(key), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };
        if scheme != SCHEME {
            return false;
        }
        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(key)) else {
            return false;
        };

        let derived = pbkdf2_sha256(password.as_bytes(), &salt, iterations.max(1));
        // ct_eq is false for unequal lengths, without early exit.
        bool::from(derived.ct_eq(&expected))
    }
}

fn fresh_salt() -> [u8; 16] {
    *Uuid::new_v4().as_bytes()
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Pbkdf2PasswordHasher {
        // Keep tests fast; the derivation path is the same.
        Pbkdf2PasswordHasher::with_iterations(10)
    }

    #[test]
    fn hash_verifies_its_own_password() {
        let hasher = hasher();
        let stored = hasher.hash("hunter2");
        assert!(hasher.verify("hunter2", &stored));
        assert!(!hasher.verify("hunter3", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = hasher();
        assert_ne!(hasher.hash("hunter2"), hasher.hash("hunter2"));
    }

    #[test]
    fn stored_iteration_count_wins_over_configured() {
        // A hash written with 10 iterations verifies even if the hasher is
        // later configured for more.
        let stored = hasher().hash("hunter2");
        assert!(Pbkdf2PasswordHasher::with_iterations(20).verify("hunter2", &stored));
    }

    #[test]
    fn garbage_stored_strings_never_verify() {
        let hasher = hasher();
        assert!(!hasher.verify("hunter2", ""));
        assert!(!hasher.verify("hunter2", "plaintext"));
        assert!(!hasher.verify("hunter2", "pbkdf2-sha256$abc$zz$zz"));
    }

    #[test]
    fn vector_matches_known_pbkdf2_output() {
        // RFC 6070-style vector recomputed for HMAC-SHA256:
        // PBKDF2("password", "salt", 1) first block.
        let key = pbkdf2_sha256(b"password", b"salt", 1);
        assert_eq!(
            hex::encode(key),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }
}
