//! Capability introspection: lets clients (and operators) ask what the
//! current principal may do without attempting the action.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    routing::{get, post},
    Json, Router,
};

use storefront_auth::{Capability, Principal, Role};

use crate::app::services::AppServices;
use crate::app::{dto, envelope};
use crate::guard::RouteGuard;

const VIEW_TABLE: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator]);

pub fn router() -> Router {
    Router::new()
        .route("/check", get(check_capability))
        .route("/check-multiple", post(check_multiple))
        .route("/mine", get(my_permissions))
        .route("/roles", get(role_table))
}

pub async fn check_capability(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<dto::CapabilityQuery>,
) -> axum::response::Response {
    let capability = Capability::new(query.capability.clone());
    let allowed = services.policy.has_capability(principal.role, &capability);
    envelope::ok(serde_json::json!({
        "capability": capability.as_str(),
        "allowed": allowed,
    }))
}

pub async fn check_multiple(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CheckMultipleRequest>,
) -> axum::response::Response {
    let mut results = serde_json::Map::new();
    let mut allowed_count = 0usize;
    for name in &body.capabilities {
        let allowed = services
            .policy
            .has_capability(principal.role, &Capability::new(name.clone()));
        if allowed {
            allowed_count += 1;
        }
        results.insert(name.clone(), serde_json::Value::Bool(allowed));
    }

    envelope::ok(serde_json::json!({
        "results": results,
        "summary": {
            "allowed": allowed_count,
            "denied": body.capabilities.len() - allowed_count,
        },
    }))
}

pub async fn my_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    let capabilities: Vec<String> = services
        .policy
        .capabilities_of(principal.role)
        .iter()
        .map(|c| c.as_str().to_owned())
        .collect();

    envelope::ok(serde_json::json!({
        "role": principal.role.as_str(),
        "rank": principal.role.rank(),
        "capabilities": capabilities,
    }))
}

pub async fn role_table(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if let Err(e) = VIEW_TABLE.authorize(&principal) {
        return envelope::auth_error(&e);
    }

    let mut table = serde_json::Map::new();
    for role in Role::ALL {
        let capabilities: Vec<String> = services
            .policy
            .capabilities_of(role)
            .iter()
            .map(|c| c.as_str().to_owned())
            .collect();
        table.insert(
            role.as_str().to_owned(),
            serde_json::json!({
                "rank": role.rank(),
                "capabilities": capabilities,
            }),
        );
    }

    envelope::ok(serde_json::Value::Object(table))
}
