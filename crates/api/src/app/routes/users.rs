//! User administration: listing, activation toggles, role changes.
//!
//! Toggle/role mutations apply the admin-protection rules from
//! `storefront-auth` before any write: only self-directed changes may touch
//! an admin account, and nobody may hand the admin role to someone else.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::{get, patch, put},
    Json, Router,
};

use storefront_auth::{authorize_deactivation, authorize_role_change, Principal, Role};
use storefront_core::UserId;
use storefront_infra::UserStore;

use crate::app::services::AppServices;
use crate::app::{dto, envelope};
use crate::guard::RouteGuard;

/// Staff with the `view_users` capability.
const VIEW: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator]);
/// Activation toggles are staff actions; the admin-protection rule does the
/// fine-grained filtering.
const TOGGLE: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator]);
/// Role assignment is admin-only.
const ASSIGN_ROLE: RouteGuard = RouteGuard::roles(&[Role::Admin]);

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/:id/toggle-active", patch(toggle_active))
        .route("/:id/role", put(change_role))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if let Err(e) = VIEW.authorize(&principal) {
        return envelope::auth_error(&e);
    }
    match services.users.list().await {
        Ok(users) => envelope::ok(serde_json::json!({
            "users": users.iter().map(dto::user_to_json).collect::<Vec<_>>(),
        })),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = VIEW.authorize(&principal) {
        return envelope::auth_error(&e);
    }
    let id: UserId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };
    match services.users.find_by_id(id).await {
        Ok(Some(user)) => envelope::ok(dto::user_to_json(&user)),
        Ok(None) => envelope::not_found("User"),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn toggle_active(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = TOGGLE.authorize(&principal) {
        return envelope::auth_error(&e);
    }
    let id: UserId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    let target = match services.users.find_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return envelope::not_found("User"),
        Err(e) => return envelope::store_error(e),
    };

    if let Err(e) = authorize_deactivation(&principal, target.id, target.role) {
        return envelope::auth_error(&e);
    }

    let now_active = !target.is_active;
    if let Err(e) = services.users.set_active(target.id, now_active).await {
        return envelope::store_error(e);
    }

    tracing::info!(
        target = %target.id,
        by = %principal.id,
        is_active = now_active,
        "account activation toggled"
    );
    let message = if now_active {
        "User activated successfully"
    } else {
        "User deactivated successfully"
    };
    envelope::ok_message(
        message,
        Some(serde_json::json!({ "id": target.id.to_string(), "is_active": now_active })),
    )
}

pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::ChangeRoleRequest>,
) -> axum::response::Response {
    if let Err(e) = ASSIGN_ROLE.authorize(&principal) {
        return envelope::auth_error(&e);
    }
    let id: UserId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    // The role string is validated before any lookup or mutation.
    let new_role: Role = match body.role.parse() {
        Ok(role) => role,
        Err(e) => return envelope::auth_error(&e),
    };

    let target = match services.users.find_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return envelope::not_found("User"),
        Err(e) => return envelope::store_error(e),
    };

    if let Err(e) = authorize_role_change(&principal, target.id, target.role, new_role) {
        return envelope::auth_error(&e);
    }

    if let Err(e) = services.users.set_role(target.id, new_role).await {
        return envelope::store_error(e);
    }

    tracing::info!(
        target = %target.id,
        by = %principal.id,
        role = new_role.as_str(),
        "role changed"
    );
    envelope::ok_message(
        "Role updated",
        Some(serde_json::json!({ "id": target.id.to_string(), "role": new_role.as_str() })),
    )
}
