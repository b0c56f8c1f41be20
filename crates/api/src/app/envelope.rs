//! JSON response envelope and error mapping.
//!
//! Every endpoint answers with `{success, message?, data?, error?}`.
//! Policy failures are mapped here, in one place, so route handlers only
//! propagate typed errors.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use storefront_auth::AuthError;
use storefront_core::DomainError;
use storefront_infra::StoreError;

pub fn ok(data: Value) -> axum::response::Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

pub fn ok_message(message: impl Into<String>, data: Option<Value>) -> axum::response::Response {
    with_message(StatusCode::OK, message, data)
}

pub fn created(message: impl Into<String>, data: Value) -> axum::response::Response {
    with_message(StatusCode::CREATED, message, Some(data))
}

fn with_message(
    status: StatusCode,
    message: impl Into<String>,
    data: Option<Value>,
) -> axum::response::Response {
    let mut body = json!({ "success": true, "message": message.into() });
    if let Some(data) = data {
        body["data"] = data;
    }
    (status, Json(body)).into_response()
}

pub fn failure(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
        .into_response()
}

pub fn not_found(what: &str) -> axum::response::Response {
    failure(StatusCode::NOT_FOUND, format!("{what} not found"))
}

pub fn bad_request(message: impl Into<String>) -> axum::response::Response {
    failure(StatusCode::BAD_REQUEST, message)
}

/// Map an authorization failure to its wire shape.
///
/// `EmailUnverified` carries `needsVerification: true` so clients can route
/// to a resend-verification flow.
pub fn auth_error(err: &AuthError) -> axum::response::Response {
    let status = match err {
        AuthError::TokenMissing
        | AuthError::TokenInvalid
        | AuthError::PrincipalNotFound
        | AuthError::AccountInactive => StatusCode::UNAUTHORIZED,
        AuthError::EmailUnverified => {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "success": false,
                    "error": err.to_string(),
                    "needsVerification": true,
                })),
            )
                .into_response();
        }
        AuthError::Forbidden { .. }
        | AuthError::OwnershipDenied
        | AuthError::OnlySelfPromotion
        | AuthError::AdminRoleProtected
        | AuthError::AdminDeactivationProtected => StatusCode::FORBIDDEN,
        AuthError::InvalidRole(_) => StatusCode::BAD_REQUEST,
    };
    failure(status, err.to_string())
}

pub fn store_error(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => failure(StatusCode::NOT_FOUND, "Resource not found"),
        StoreError::Conflict(message) => failure(StatusCode::BAD_REQUEST, message),
        StoreError::Backend(cause) => {
            // The cause stays in the logs; the wire gets a generic 500.
            tracing::error!(%cause, "storage backend failure");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub fn domain_error(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound => failure(StatusCode::NOT_FOUND, "Resource not found"),
        DomainError::Validation(message)
        | DomainError::InvalidId(message)
        | DomainError::Conflict(message) => failure(StatusCode::BAD_REQUEST, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_auth::Role;

    fn status_of(response: &axum::response::Response) -> StatusCode {
        response.status()
    }

    #[test]
    fn token_failures_map_to_401() {
        for err in [
            AuthError::TokenMissing,
            AuthError::TokenInvalid,
            AuthError::PrincipalNotFound,
            AuthError::AccountInactive,
        ] {
            assert_eq!(status_of(&auth_error(&err)), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn policy_denials_map_to_403() {
        for err in [
            AuthError::EmailUnverified,
            AuthError::OwnershipDenied,
            AuthError::OnlySelfPromotion,
            AuthError::AdminRoleProtected,
            AuthError::AdminDeactivationProtected,
            AuthError::Forbidden {
                required: vec![Role::Admin],
                actual: Role::Customer,
            },
        ] {
            assert_eq!(status_of(&auth_error(&err)), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn invalid_role_maps_to_400() {
        assert_eq!(
            status_of(&auth_error(&AuthError::InvalidRole("superuser".into()))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn backend_faults_map_to_generic_500() {
        let response = store_error(StoreError::backend("disk on fire"));
        assert_eq!(status_of(&response), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
