//! Request DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::{json, Value};

use storefront_auth::User;
use storefront_catalog::{Category, Product};
use storefront_orders::Order;
use storefront_reviews::{RatingSummary, Review};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: String,
    pub price_cents: u64,
    pub stock_quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub price_cents: Option<u64>,
    pub stock_quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub product_id: String,
    pub text: String,
    pub rating: u8,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub rating: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct CapabilityQuery {
    pub capability: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckMultipleRequest {
    pub capabilities: Vec<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// Public view of a user record. Password hash and flow tokens never leave
/// the server.
pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id.to_string(),
        "username": user.username,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "role": user.role.as_str(),
        "is_active": user.is_active,
        "is_verified": user.is_verified,
        "created_at": user.created_at.to_rfc3339(),
    })
}

pub fn product_to_json(product: &Product) -> Value {
    json!({
        "id": product.id.to_string(),
        "name": product.name,
        "description": product.description,
        "category_id": product.category_id.to_string(),
        "price_cents": product.price_cents,
        "stock_quantity": product.stock_quantity,
        "in_stock": product.in_stock(),
        "created_by": product.created_by.to_string(),
        "created_at": product.created_at.to_rfc3339(),
    })
}

pub fn category_to_json(category: &Category) -> Value {
    json!({
        "id": category.id.to_string(),
        "name": category.name,
        "description": category.description,
        "created_by": category.created_by.to_string(),
        "created_at": category.created_at.to_rfc3339(),
    })
}

pub fn order_to_json(order: &Order) -> Value {
    json!({
        "id": order.id.to_string(),
        "user_id": order.user_id.to_string(),
        "items": order.items.iter().map(|item| json!({
            "product_id": item.product_id.to_string(),
            "quantity": item.quantity,
            "price_cents_at_time": item.price_cents_at_time,
        })).collect::<Vec<_>>(),
        "amount_cents": order.amount_cents,
        "status": order.status.as_str(),
        "created_at": order.created_at.to_rfc3339(),
    })
}

pub fn review_to_json(review: &Review) -> Value {
    json!({
        "id": review.id.to_string(),
        "product_id": review.product_id.to_string(),
        "user_id": review.user_id.to_string(),
        "text": review.text,
        "rating": review.rating,
        "created_at": review.created_at.to_rfc3339(),
    })
}

pub fn summary_to_json(summary: &RatingSummary) -> Value {
    json!({
        "average": summary.average,
        "count": summary.count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_auth::Role;
    use storefront_core::UserId;

    #[test]
    fn user_json_omits_secret_fields() {
        let user = User {
            id: UserId::new(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "secret-hash".into(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Customer,
            is_active: true,
            is_verified: false,
            email_verification_token: Some("secret-token".into()),
            password_reset_token: None,
            password_reset_expires: None,
            created_at: Utc::now(),
        };
        let rendered = user_to_json(&user).to_string();
        assert!(!rendered.contains("secret-hash"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("alice@example.com"));
    }
}
