//! Declarative per-route authorization guard.
//!
//! Every protected route declares one `RouteGuard` instead of hand-rolling
//! the verification/role/ownership branches inline. Checks run after the
//! authentication chain in [`crate::middleware`], in a fixed order: the
//! email-verification gate first, then the role allow-list (or the
//! owner-or-role rule for instance-scoped mutations).

use storefront_auth::{can_access_owned, role_allowed, AuthError, Principal, Role};
use storefront_core::UserId;

/// Access rule for one route.
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    /// Allow-list of roles. Empty means any authenticated role.
    pub required_roles: &'static [Role],
    /// Whether the email-verification gate applies. Admins bypass it.
    pub require_verified: bool,
}

impl RouteGuard {
    /// Verified principals of the given roles.
    pub const fn roles(required_roles: &'static [Role]) -> Self {
        Self {
            required_roles,
            require_verified: true,
        }
    }

    /// Any verified principal, regardless of role.
    pub const fn any_verified() -> Self {
        Self {
            required_roles: &[],
            require_verified: true,
        }
    }

    /// Any authenticated principal, verified or not.
    pub const fn any() -> Self {
        Self {
            required_roles: &[],
            require_verified: false,
        }
    }

    /// Role-based check for collection-scoped routes.
    pub fn authorize(&self, principal: &Principal) -> Result<(), AuthError> {
        self.check_verification(principal)?;
        if !self.required_roles.is_empty() && !role_allowed(principal.role, self.required_roles) {
            return Err(AuthError::Forbidden {
                required: self.required_roles.to_vec(),
                actual: principal.role,
            });
        }
        Ok(())
    }

    /// Owner-or-role check for instance-scoped routes. The caller resolves
    /// `owner` from the resource's `created_by`/`user_id` field.
    pub fn authorize_owned(
        &self,
        principal: &Principal,
        owner: UserId,
    ) -> Result<(), AuthError> {
        self.check_verification(principal)?;
        if !can_access_owned(principal, self.required_roles, owner) {
            return Err(AuthError::OwnershipDenied);
        }
        Ok(())
    }

    /// The email-verification gate alone. Instance-scoped handlers run this
    /// before loading the resource, so an unverified caller learns nothing
    /// about whether the resource exists; the full owner-or-role check runs
    /// afterwards via [`Self::authorize_owned`].
    pub fn check_verification(&self, principal: &Principal) -> Result<(), AuthError> {
        if self.require_verified && !principal.passes_verification_gate() {
            return Err(AuthError::EmailUnverified);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role, verified: bool) -> Principal {
        Principal {
            id: UserId::new(),
            role,
            is_active: true,
            is_verified: verified,
        }
    }

    const STAFF: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator]);

    #[test]
    fn verification_gate_fires_before_role_check() {
        // An unverified seller hitting a staff route must see the
        // verification failure, not the role failure.
        let err = STAFF.authorize(&principal(Role::Seller, false)).unwrap_err();
        assert_eq!(err, AuthError::EmailUnverified);
    }

    #[test]
    fn unverified_admin_bypasses_the_gate() {
        assert!(STAFF.authorize(&principal(Role::Admin, false)).is_ok());
    }

    #[test]
    fn role_outside_allow_list_is_forbidden() {
        let err = STAFF.authorize(&principal(Role::Seller, true)).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden { .. }));
    }

    #[test]
    fn empty_allow_list_admits_any_verified_role() {
        let guard = RouteGuard::any_verified();
        for role in Role::ALL {
            assert!(guard.authorize(&principal(role, true)).is_ok());
        }
        assert_eq!(
            guard.authorize(&principal(Role::Customer, false)),
            Err(AuthError::EmailUnverified)
        );
    }

    #[test]
    fn owner_passes_ownership_check_without_role() {
        let p = principal(Role::Customer, true);
        assert!(STAFF.authorize_owned(&p, p.id).is_ok());
    }

    #[test]
    fn non_owner_without_role_is_denied() {
        let p = principal(Role::Customer, true);
        assert_eq!(
            STAFF.authorize_owned(&p, UserId::new()),
            Err(AuthError::OwnershipDenied)
        );
    }

    #[test]
    fn allowed_role_passes_ownership_check_on_foreign_resource() {
        let p = principal(Role::Moderator, true);
        assert!(STAFF.authorize_owned(&p, UserId::new()).is_ok());
    }
}
