/// Password hashing boundary.
///
/// The hash primitive itself is an external collaborator (assumed to be a
/// standard slow hash); this crate only fixes the narrow interface the
/// credential flows consume. `storefront-infra` provides the production
/// implementation.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password, embedding salt and parameters in the
    /// returned string.
    fn hash(&self, password: &str) -> String;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, password: &str, stored: &str) -> bool;
}
