//! Review routes. Per-product listings are public; writing requires a
//! verified account, and instance mutations use owner-or-staff.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::{delete, get, post, put},
    Json, Router,
};

use storefront_auth::{Principal, Role};
use storefront_core::{ProductId, ReviewId};
use storefront_infra::{ProductStore, ReviewStore};
use storefront_reviews::{NewReview, ReviewUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, envelope};
use crate::guard::RouteGuard;

const WRITE: RouteGuard = RouteGuard::any_verified();
const MUTATE: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator]);

pub fn public_router() -> Router {
    Router::new().route("/product/:product_id", get(list_for_product))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/", post(create_review))
        .route("/:id", put(update_review))
        .route("/:id", delete(delete_review))
}

pub async fn list_for_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match product_id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    let reviews = match services.reviews.list_by_product(product_id).await {
        Ok(reviews) => reviews,
        Err(e) => return envelope::store_error(e),
    };
    let summary = match services.reviews.rating_summary(product_id).await {
        Ok(summary) => summary,
        Err(e) => return envelope::store_error(e),
    };

    envelope::ok(serde_json::json!({
        "reviews": reviews.iter().map(dto::review_to_json).collect::<Vec<_>>(),
        "rating": dto::summary_to_json(&summary),
    }))
}

pub async fn create_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateReviewRequest>,
) -> axum::response::Response {
    if let Err(e) = WRITE.authorize(&principal) {
        return envelope::auth_error(&e);
    }

    let product_id: ProductId = match body.product_id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };
    match services.products.find_by_id(product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return envelope::not_found("Product"),
        Err(e) => return envelope::store_error(e),
    }

    let input = NewReview {
        product_id,
        user_id: principal.id,
        text: body.text,
        rating: body.rating,
    };
    if let Err(e) = input.validate() {
        return envelope::domain_error(e);
    }

    match services.reviews.create(input).await {
        Ok(review) => {
            tracing::info!(review_id = %review.id, by = %principal.id, "review created");
            envelope::created("Review created", dto::review_to_json(&review))
        }
        Err(e) => envelope::store_error(e),
    }
}

pub async fn update_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateReviewRequest>,
) -> axum::response::Response {
    // Gate before the lookup so existence is not revealed to the unverified.
    if let Err(e) = MUTATE.check_verification(&principal) {
        return envelope::auth_error(&e);
    }

    let id: ReviewId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    let review = match services.reviews.find_by_id(id).await {
        Ok(Some(review)) => review,
        Ok(None) => return envelope::not_found("Review"),
        Err(e) => return envelope::store_error(e),
    };

    if let Err(e) = MUTATE.authorize_owned(&principal, review.user_id) {
        return envelope::auth_error(&e);
    }

    let update = ReviewUpdate {
        text: body.text,
        rating: body.rating,
    };
    if let Err(e) = update.validate() {
        return envelope::domain_error(e);
    }

    match services.reviews.update(id, update).await {
        Ok(review) => envelope::ok_message("Review updated", Some(dto::review_to_json(&review))),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn delete_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = MUTATE.check_verification(&principal) {
        return envelope::auth_error(&e);
    }

    let id: ReviewId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    let review = match services.reviews.find_by_id(id).await {
        Ok(Some(review)) => review,
        Ok(None) => return envelope::not_found("Review"),
        Err(e) => return envelope::store_error(e),
    };

    if let Err(e) = MUTATE.authorize_owned(&principal, review.user_id) {
        return envelope::auth_error(&e);
    }

    match services.reviews.delete(id).await {
        Ok(_) => {
            tracing::info!(review_id = %id, by = %principal.id, "review deleted");
            envelope::ok_message("Review deleted", None)
        }
        Err(e) => envelope::store_error(e),
    }
}
