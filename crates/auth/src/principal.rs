use serde::{Deserialize, Serialize};

use storefront_core::UserId;

use crate::Role;

/// A fully resolved principal for authorization decisions.
///
/// Always constructed from a freshly loaded user record, never from token
/// claims: role and account-state changes take effect on the next request
/// without re-issuing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the email-verification gate would block this principal.
    ///
    /// Admins bypass the gate regardless of their own verification state.
    pub fn passes_verification_gate(&self) -> bool {
        self.is_verified || self.role.is_admin()
    }
}
