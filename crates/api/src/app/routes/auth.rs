//! Account flows: registration, login, verification, password recovery.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use storefront_auth::{AuthError, NewUser, PasswordHasher, Principal, User};
use storefront_core::DomainError;
use storefront_infra::{EmailSender, ProfileUpdate, UserStore};

use crate::app::services::AppServices;
use crate::app::{dto, envelope};

/// Password-reset tokens live this long.
const RESET_TOKEN_VALIDITY_HOURS: i64 = 1;

const PASSWORD_MIN_LEN: usize = 6;

pub fn public_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email", get(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/change-password", post(change_password))
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.len() < PASSWORD_MIN_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

async fn send_verification_email(services: &AppServices, user: &User) {
    let Some(token) = user.email_verification_token.as_deref() else {
        return;
    };
    let body = format!("Verify your email with token: {token}");
    // Delivery failure must not fail the request that triggered the mail.
    if let Err(e) = services
        .email
        .send(&user.email, "Verify your email", &body)
        .await
    {
        tracing::warn!(user_id = %user.id, error = %e, "verification email not sent");
    }
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    if let Err(e) = validate_password(&body.password) {
        return envelope::domain_error(e);
    }

    let input = NewUser {
        username: body.username,
        email: body.email,
        password_hash: services.passwords.hash(&body.password),
        first_name: body.first_name.unwrap_or_default(),
        last_name: body.last_name.unwrap_or_default(),
        role: None,
    };
    if let Err(e) = input.validate() {
        return envelope::domain_error(e);
    }

    let user = match services.users.create(input).await {
        Ok(user) => user,
        Err(e) => return envelope::store_error(e),
    };

    send_verification_email(&services, &user).await;

    tracing::info!(user_id = %user.id, "user registered");
    envelope::created(
        "Registration successful. Please check your email to verify your account.",
        dto::user_to_json(&user),
    )
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    // The identifier is an email address or, failing that, a username.
    let user = match services.users.find_by_email(&body.email).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => match services.users.find_by_username(&body.email).await {
            Ok(user) => user,
            Err(e) => return envelope::store_error(e),
        },
        Err(e) => return envelope::store_error(e),
    };
    let Some(user) = user else {
        return invalid_credentials();
    };

    if !services.passwords.verify(&body.password, &user.password_hash) {
        return invalid_credentials();
    }

    if !user.is_active {
        return envelope::auth_error(&AuthError::AccountInactive);
    }

    // Verification gates login for everyone but admins, credentials first so
    // the flag is only revealed to callers who hold the password.
    if !user.principal().passes_verification_gate() {
        return envelope::auth_error(&AuthError::EmailUnverified);
    }

    let token = match services.tokens.issue(user.id) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token issuance failed");
            return envelope::failure(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            );
        }
    };

    tracing::info!(user_id = %user.id, "user logged in");
    envelope::ok(serde_json::json!({
        "token": token,
        "user": dto::user_to_json(&user),
    }))
}

fn invalid_credentials() -> axum::response::Response {
    envelope::failure(
        axum::http::StatusCode::UNAUTHORIZED,
        "Invalid email or password",
    )
}

pub async fn verify_email(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::VerifyEmailQuery>,
) -> axum::response::Response {
    let user = match services.users.find_by_verification_token(&query.token).await {
        Ok(Some(user)) => user,
        Ok(None) => return envelope::bad_request("Invalid or expired verification token"),
        Err(e) => return envelope::store_error(e),
    };

    if let Err(e) = services.users.mark_verified(user.id).await {
        return envelope::store_error(e);
    }

    tracing::info!(user_id = %user.id, "email verified");
    envelope::ok_message("Email verified successfully", None)
}

pub async fn resend_verification(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::EmailRequest>,
) -> axum::response::Response {
    match services.users.find_by_email(&body.email).await {
        Ok(Some(user)) if !user.is_verified => {
            send_verification_email(&services, &user).await;
        }
        Ok(_) => {}
        Err(e) => return envelope::store_error(e),
    }

    // One answer regardless of account existence or state.
    envelope::ok_message(
        "If that email is registered and unverified, a verification email has been sent",
        None,
    )
}

pub async fn forgot_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::EmailRequest>,
) -> axum::response::Response {
    match services.users.find_by_email(&body.email).await {
        Ok(Some(user)) => {
            let token = Uuid::new_v4().simple().to_string();
            let expires = Utc::now() + Duration::hours(RESET_TOKEN_VALIDITY_HOURS);
            if let Err(e) = services.users.set_reset_token(user.id, &token, expires).await {
                return envelope::store_error(e);
            }
            let body = format!("Reset your password with token: {token}");
            if let Err(e) = services.email.send(&user.email, "Password reset", &body).await {
                tracing::warn!(user_id = %user.id, error = %e, "reset email not sent");
            }
        }
        Ok(None) => {}
        Err(e) => return envelope::store_error(e),
    }

    // One answer regardless of account existence.
    envelope::ok_message(
        "If that email is registered, a password reset email has been sent",
        None,
    )
}

pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ResetPasswordRequest>,
) -> axum::response::Response {
    if let Err(e) = validate_password(&body.password) {
        return envelope::domain_error(e);
    }

    let user = match services.users.find_by_reset_token(&body.token, Utc::now()).await {
        Ok(Some(user)) => user,
        Ok(None) => return envelope::bad_request("Invalid or expired reset token"),
        Err(e) => return envelope::store_error(e),
    };

    let hash = services.passwords.hash(&body.password);
    if let Err(e) = services.users.update_password(user.id, &hash).await {
        return envelope::store_error(e);
    }

    tracing::info!(user_id = %user.id, "password reset");
    envelope::ok_message("Password has been reset successfully", None)
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    match services.users.find_by_id(principal.id).await {
        Ok(Some(user)) => envelope::ok(dto::user_to_json(&user)),
        Ok(None) => envelope::not_found("User"),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> axum::response::Response {
    let update = ProfileUpdate {
        first_name: body.first_name,
        last_name: body.last_name,
    };
    match services.users.update_profile(principal.id, update).await {
        Ok(user) => envelope::ok_message("Profile updated", Some(dto::user_to_json(&user))),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> axum::response::Response {
    let user = match services.users.find_by_id(principal.id).await {
        Ok(Some(user)) => user,
        Ok(None) => return envelope::not_found("User"),
        Err(e) => return envelope::store_error(e),
    };

    if !services
        .passwords
        .verify(&body.current_password, &user.password_hash)
    {
        return envelope::bad_request("Current password is incorrect");
    }
    if let Err(e) = validate_password(&body.new_password) {
        return envelope::domain_error(e);
    }

    let hash = services.passwords.hash(&body.new_password);
    if let Err(e) = services.users.update_password(user.id, &hash).await {
        return envelope::store_error(e);
    }

    envelope::ok_message("Password changed successfully", None)
}
