//! Product catalog routes. Reads are public; creation is limited to
//! verified sellers and staff; instance mutations use owner-or-staff.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::{delete, get, post, put},
    Json, Router,
};

use storefront_auth::{Principal, Role};
use storefront_catalog::{NewProduct, ProductUpdate};
use storefront_core::{CategoryId, ProductId};
use storefront_infra::{CategoryStore, ProductStore};

use crate::app::services::AppServices;
use crate::app::{dto, envelope};
use crate::guard::RouteGuard;

const CREATE: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator, Role::Seller]);
const MUTATE: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator]);

pub fn public_router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
        .route("/category/:category_id", get(list_by_category))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/", post(create_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.products.list().await {
        Ok(products) => envelope::ok(serde_json::json!({
            "products": products.iter().map(dto::product_to_json).collect::<Vec<_>>(),
        })),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };
    match services.products.find_by_id(id).await {
        Ok(Some(product)) => envelope::ok(dto::product_to_json(&product)),
        Ok(None) => envelope::not_found("Product"),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn list_by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(category_id): Path<String>,
) -> axum::response::Response {
    let category_id: CategoryId = match category_id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };
    match services.products.list_by_category(category_id).await {
        Ok(products) => envelope::ok(serde_json::json!({
            "products": products.iter().map(dto::product_to_json).collect::<Vec<_>>(),
        })),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    if let Err(e) = CREATE.authorize(&principal) {
        return envelope::auth_error(&e);
    }

    let category_id: CategoryId = match body.category_id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };
    match services.categories.find_by_id(category_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return envelope::bad_request("Category does not exist"),
        Err(e) => return envelope::store_error(e),
    }

    let input = NewProduct {
        name: body.name,
        description: body.description,
        category_id,
        price_cents: body.price_cents,
        stock_quantity: body.stock_quantity,
        created_by: principal.id,
    };
    if let Err(e) = input.validate() {
        return envelope::domain_error(e);
    }

    match services.products.create(input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, by = %principal.id, "product created");
            envelope::created("Product created", dto::product_to_json(&product))
        }
        Err(e) => envelope::store_error(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    // Gate before the lookup so existence is not revealed to the unverified.
    if let Err(e) = MUTATE.check_verification(&principal) {
        return envelope::auth_error(&e);
    }

    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    let product = match services.products.find_by_id(id).await {
        Ok(Some(product)) => product,
        Ok(None) => return envelope::not_found("Product"),
        Err(e) => return envelope::store_error(e),
    };

    // Owner-or-staff on the resource's `created_by`.
    if let Err(e) = MUTATE.authorize_owned(&principal, product.created_by) {
        return envelope::auth_error(&e);
    }

    let category_id = match body.category_id.as_deref().map(str::parse::<CategoryId>).transpose() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };
    if let Some(category_id) = category_id {
        match services.categories.find_by_id(category_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return envelope::bad_request("Category does not exist"),
            Err(e) => return envelope::store_error(e),
        }
    }

    let update = ProductUpdate {
        name: body.name,
        description: body.description,
        category_id,
        price_cents: body.price_cents,
        stock_quantity: body.stock_quantity,
    };
    if let Err(e) = update.validate() {
        return envelope::domain_error(e);
    }

    match services.products.update(id, update).await {
        Ok(product) => envelope::ok_message("Product updated", Some(dto::product_to_json(&product))),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = MUTATE.check_verification(&principal) {
        return envelope::auth_error(&e);
    }

    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    let product = match services.products.find_by_id(id).await {
        Ok(Some(product)) => product,
        Ok(None) => return envelope::not_found("Product"),
        Err(e) => return envelope::store_error(e),
    };

    if let Err(e) = MUTATE.authorize_owned(&principal, product.created_by) {
        return envelope::auth_error(&e);
    }

    match services.products.delete(id).await {
        Ok(_) => {
            tracing::info!(product_id = %id, by = %principal.id, "product deleted");
            envelope::ok_message("Product deleted", None)
        }
        Err(e) => envelope::store_error(e),
    }
}
