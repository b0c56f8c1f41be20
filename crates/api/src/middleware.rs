//! Per-request authentication chain.
//!
//! Gates fire in a fixed order and each one short-circuits: missing token,
//! invalid token, dangling principal, deactivated account. A failed gate
//! never reveals whether a later gate would also have failed. Verification
//! and role/ownership checks are route-specific and live in [`crate::guard`].

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use storefront_auth::AuthError;
use storefront_infra::UserStore;

use crate::app::envelope;
use crate::app::services::AppServices;

/// Authenticate the request and attach the resolved [`Principal`] as a
/// request extension.
///
/// The principal is rebuilt from a freshly loaded user record on every
/// request, so role changes and deactivation take effect immediately; the
/// token only contributes the user id. No writes happen in this layer.
///
/// [`Principal`]: storefront_auth::Principal
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(err) => return envelope::auth_error(&err),
    };

    let user_id = match services.tokens.verify(token) {
        Ok(user_id) => user_id,
        Err(err) => return envelope::auth_error(&err),
    };

    let user = match services.users.find_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(%user_id, "token subject no longer resolves to a user");
            return envelope::auth_error(&AuthError::PrincipalNotFound);
        }
        Err(err) => return envelope::store_error(err),
    };

    if !user.is_active {
        return envelope::auth_error(&AuthError::AccountInactive);
    }

    req.extensions_mut().insert(user.principal());
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::TokenMissing)?;

    let header = header.to_str().map_err(|_| AuthError::TokenMissing)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::TokenMissing)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::TokenMissing);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn missing_header_is_token_missing() {
        assert_eq!(
            extract_bearer(&HeaderMap::new()),
            Err(AuthError::TokenMissing)
        );
    }

    #[test]
    fn non_bearer_scheme_is_token_missing() {
        assert_eq!(
            extract_bearer(&headers_with("Basic abc")),
            Err(AuthError::TokenMissing)
        );
    }

    #[test]
    fn empty_bearer_is_token_missing() {
        assert_eq!(
            extract_bearer(&headers_with("Bearer   ")),
            Err(AuthError::TokenMissing)
        );
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc.def")), Ok("abc.def"));
    }
}
