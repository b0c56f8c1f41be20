//! Role policy: the role → capability table and the pure decision functions.
//!
//! The policy object is immutable, constructed once at process start and
//! passed by reference into every evaluation. Ownership is a relationship,
//! not a capability: `can_access_owned` grants access to a resource instance
//! independent of the principal's capability set when policy says
//! "owner-or-role".

use std::collections::{HashMap, HashSet};

use storefront_core::UserId;

use crate::{AuthError, Capability, Principal, Role};

/// Immutable role → capability mapping.
#[derive(Debug, Clone)]
pub struct RolePolicy {
    capabilities: HashMap<Role, HashSet<Capability>>,
}

impl RolePolicy {
    /// The standard storefront policy table.
    ///
    /// Admin carries the wildcard and therefore every capability, including
    /// ones defined after this table was authored.
    pub fn standard() -> Self {
        let mut capabilities = HashMap::new();

        capabilities.insert(Role::Admin, HashSet::from([Capability::WILDCARD]));

        capabilities.insert(
            Role::Moderator,
            caps(&[
                "view_users",
                "edit_products",
                "manage_categories",
                "moderate_reviews",
                "update_order_status",
            ]),
        );

        capabilities.insert(
            Role::Seller,
            caps(&[
                "create_products",
                "edit_own_products",
                "manage_own_products",
                "view_own_orders",
                "update_own_orders",
            ]),
        );

        capabilities.insert(
            Role::Customer,
            caps(&[
                "view_products",
                "create_orders",
                "write_reviews",
                "view_own_orders",
                "cancel_own_orders",
            ]),
        );

        Self { capabilities }
    }

    /// True if the role's set contains the capability, or the role's set is
    /// the universal wildcard.
    pub fn has_capability(&self, role: Role, capability: &Capability) -> bool {
        let Some(set) = self.capabilities.get(&role) else {
            return false;
        };
        set.contains(&Capability::WILDCARD) || set.contains(capability)
    }

    /// The configured capabilities of a role, sorted for stable output.
    pub fn capabilities_of(&self, role: Role) -> Vec<Capability> {
        let mut list: Vec<Capability> = self
            .capabilities
            .get(&role)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        list.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        list
    }
}

fn caps(names: &[&'static str]) -> HashSet<Capability> {
    names.iter().map(|n| Capability::new(*n)).collect()
}

/// Allow-list membership check.
///
/// This is deliberately `role ∈ required` and not a rank comparison: role
/// sets in this system are not always nested (e.g. "seller-or-admin" for
/// product creation excludes no one by rank cutoff).
pub fn role_allowed(role: Role, required: &[Role]) -> bool {
    required.contains(&role)
}

/// The ownership-or-role pattern used uniformly for update/delete on
/// products, orders and reviews.
pub fn can_access_owned(principal: &Principal, required: &[Role], owner: UserId) -> bool {
    role_allowed(principal.role, required) || principal.id == owner
}

/// Validate a role-change request against the admin-protection rules.
///
/// - Nobody may elevate *another* principal to admin, not even an admin.
/// - An admin account's role may only be changed by that same principal.
///
/// Callers must have parsed `new_role` from the wire already, so unknown
/// role strings fail with `InvalidRole` before this point and before any
/// mutation.
pub fn authorize_role_change(
    requester: &Principal,
    target_id: UserId,
    target_role: Role,
    new_role: Role,
) -> Result<(), AuthError> {
    if new_role == Role::Admin && requester.id != target_id {
        return Err(AuthError::OnlySelfPromotion);
    }
    if target_role == Role::Admin && requester.id != target_id {
        return Err(AuthError::AdminRoleProtected);
    }
    Ok(())
}

/// Validate an activate/deactivate toggle against the admin-protection rules.
///
/// Admin accounts cannot be deactivated by anyone but themselves.
pub fn authorize_deactivation(
    requester: &Principal,
    target_id: UserId,
    target_role: Role,
) -> Result<(), AuthError> {
    if target_role == Role::Admin && requester.id != target_id {
        return Err(AuthError::AdminDeactivationProtected);
    }
    Ok(())
}
