use thiserror::Error;

use crate::Role;

/// Authentication/authorization failure.
///
/// Every variant corresponds to one terminal state of the per-request
/// authorization chain. The HTTP layer maps these to status codes and the
/// JSON envelope; this crate only states what went wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token was presented.
    #[error("Access token required")]
    TokenMissing,

    /// Signature check failed, the token expired, or it was malformed.
    /// All three collapse to one outcome so callers learn nothing about
    /// which gate failed; the internal cause is logged at debug level.
    #[error("Invalid or expired token")]
    TokenInvalid,

    /// The token subject no longer resolves to a user record.
    /// Indistinguishable from an invalid token on the wire.
    #[error("Invalid or expired token")]
    PrincipalNotFound,

    #[error("Account is deactivated")]
    AccountInactive,

    /// Non-admin principal with an unconfirmed email hit a verified-only
    /// route. Carries a machine-readable flag on the wire so clients can
    /// route to a resend-verification flow.
    #[error("Email not verified. Please check your email.")]
    EmailUnverified,

    /// The principal's role is not in the route's allow-list.
    #[error("Access denied. Required roles: {}. Your role: {actual}", roles_csv(required))]
    Forbidden { required: Vec<Role>, actual: Role },

    /// Owner-or-role check failed: not an allowed role and not the owner.
    #[error("Access denied. You can only access your own resources")]
    OwnershipDenied,

    /// A request tried to set `role = admin` on a different principal.
    #[error("Only self-promotion to admin is allowed")]
    OnlySelfPromotion,

    /// A request tried to change the role of an admin account.
    #[error("Cannot change role of admin user")]
    AdminRoleProtected,

    /// A request tried to deactivate an admin account.
    #[error("Cannot deactivate admin user")]
    AdminDeactivationProtected,

    /// A role-change request carried a string outside the role enum.
    #[error("Invalid role '{0}'. Valid roles: admin, moderator, seller, customer")]
    InvalidRole(String),
}

fn roles_csv(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_message_names_required_and_actual_roles() {
        let err = AuthError::Forbidden {
            required: vec![Role::Admin, Role::Moderator],
            actual: Role::Seller,
        };
        let msg = err.to_string();
        assert!(msg.contains("admin, moderator"));
        assert!(msg.contains("seller"));
    }

    #[test]
    fn token_failures_share_one_message() {
        // Expired vs malformed vs dangling subject must not be
        // distinguishable from the outside.
        assert_eq!(
            AuthError::TokenInvalid.to_string(),
            AuthError::PrincipalNotFound.to_string()
        );
    }

    #[test]
    fn invalid_role_message_lists_valid_roles() {
        let msg = AuthError::InvalidRole("superuser".into()).to_string();
        for role in Role::ALL {
            assert!(msg.contains(role.as_str()));
        }
    }
}
