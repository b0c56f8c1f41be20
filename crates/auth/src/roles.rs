use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Role of an account, used for RBAC decisions.
///
/// Roles form a closed set. Parsing an unknown role string is a hard error
/// (`AuthError::InvalidRole`), never a silent fallback to the lowest
/// privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    Seller,
    Customer,
}

impl Role {
    /// All valid roles, in rank order (most privileged first).
    pub const ALL: [Role; 4] = [Role::Admin, Role::Moderator, Role::Seller, Role::Customer];

    /// Rank within the role hierarchy. Lower numeral = more privileged.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::Moderator => 2,
            Role::Seller => 3,
            Role::Customer => 4,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Seller => "seller",
            Role::Customer => "customer",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        // Canonical default for newly registered accounts.
        Role::Customer
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "seller" => Ok(Role::Seller),
            "customer" => Ok(Role::Customer),
            other => Err(AuthError::InvalidRole(other.to_string())),
        }
    }
}
