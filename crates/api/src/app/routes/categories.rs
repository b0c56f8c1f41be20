//! Category routes. Reads are public; mutations are staff-only.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::{delete, get, post, put},
    Json, Router,
};

use storefront_auth::{Principal, Role};
use storefront_catalog::{CategoryUpdate, NewCategory};
use storefront_core::CategoryId;
use storefront_infra::{CategoryStore, ProductStore};

use crate::app::services::AppServices;
use crate::app::{dto, envelope};
use crate::guard::RouteGuard;

const MANAGE: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator]);

pub fn public_router() -> Router {
    Router::new()
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/", post(create_category))
        .route("/:id", put(update_category))
        .route("/:id", delete(delete_category))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.categories.list().await {
        Ok(categories) => envelope::ok(serde_json::json!({
            "categories": categories.iter().map(dto::category_to_json).collect::<Vec<_>>(),
        })),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };
    match services.categories.find_by_id(id).await {
        Ok(Some(category)) => envelope::ok(dto::category_to_json(&category)),
        Ok(None) => envelope::not_found("Category"),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateCategoryRequest>,
) -> axum::response::Response {
    if let Err(e) = MANAGE.authorize(&principal) {
        return envelope::auth_error(&e);
    }

    let input = NewCategory {
        name: body.name,
        description: body.description,
        created_by: principal.id,
    };
    if let Err(e) = input.validate() {
        return envelope::domain_error(e);
    }

    match services.categories.create(input).await {
        Ok(category) => {
            tracing::info!(category_id = %category.id, by = %principal.id, "category created");
            envelope::created("Category created", dto::category_to_json(&category))
        }
        Err(e) => envelope::store_error(e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCategoryRequest>,
) -> axum::response::Response {
    if let Err(e) = MANAGE.authorize(&principal) {
        return envelope::auth_error(&e);
    }
    let id: CategoryId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    let update = CategoryUpdate {
        name: body.name,
        description: body.description,
    };
    if let Err(e) = update.validate() {
        return envelope::domain_error(e);
    }

    match services.categories.update(id, update).await {
        Ok(category) => {
            envelope::ok_message("Category updated", Some(dto::category_to_json(&category)))
        }
        Err(e) => envelope::store_error(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = MANAGE.authorize(&principal) {
        return envelope::auth_error(&e);
    }
    let id: CategoryId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    // A category with live products cannot be removed.
    match services.products.count_in_category(id).await {
        Ok(0) => {}
        Ok(_) => return envelope::bad_request("Cannot delete category with products"),
        Err(e) => return envelope::store_error(e),
    }

    match services.categories.delete(id).await {
        Ok(()) => {
            tracing::info!(category_id = %id, by = %principal.id, "category deleted");
            envelope::ok_message("Category deleted", None)
        }
        Err(e) => envelope::store_error(e),
    }
}
