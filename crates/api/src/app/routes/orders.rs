//! Order routes. All order access is authenticated; reads of a single order
//! are owner-or-staff, the full listing is admin-only.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    routing::{get, post, put},
    Json, Router,
};

use storefront_auth::{Principal, Role};
use storefront_core::{OrderId, ProductId};
use storefront_infra::{OrderStore, ProductStore, StoreError};
use storefront_orders::{NewOrder, OrderItem, OrderStatus};

use crate::app::services::AppServices;
use crate::app::{dto, envelope};
use crate::guard::RouteGuard;

const PLACE: RouteGuard = RouteGuard::any_verified();
const VIEW_OWN: RouteGuard = RouteGuard::any_verified();
const VIEW_INSTANCE: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator]);
const LIST_ALL: RouteGuard = RouteGuard::roles(&[Role::Admin]);
const SET_STATUS: RouteGuard = RouteGuard::roles(&[Role::Admin, Role::Moderator]);

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/my", get(my_orders))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_status))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    if let Err(e) = PLACE.authorize(&principal) {
        return envelope::auth_error(&e);
    }

    // Resolve items against the live catalog: existence, stock, and the
    // price snapshot all come from the product row, never the client. Stock
    // is taken via atomic per-row decrements, so two concurrent orders
    // cannot both pass a stock check and oversell; anything already taken
    // is put back if a later item (or the order write) fails.
    let mut items = Vec::with_capacity(body.items.len());
    let mut taken = Vec::with_capacity(body.items.len());
    for item in &body.items {
        let product_id: ProductId = match item.product_id.parse() {
            Ok(id) => id,
            Err(e) => {
                restore_stock(&services, &taken).await;
                return envelope::domain_error(e);
            }
        };
        let product = match services.products.find_by_id(product_id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                restore_stock(&services, &taken).await;
                return envelope::bad_request(format!("Product not found: {}", item.product_id));
            }
            Err(e) => {
                restore_stock(&services, &taken).await;
                return envelope::store_error(e);
            }
        };
        match services
            .products
            .adjust_stock(product_id, -i64::from(item.quantity))
            .await
        {
            Ok(_) => taken.push((product_id, item.quantity)),
            Err(StoreError::Conflict(_)) => {
                restore_stock(&services, &taken).await;
                return envelope::bad_request(format!("Insufficient stock for {}", product.name));
            }
            Err(e) => {
                restore_stock(&services, &taken).await;
                return envelope::store_error(e);
            }
        }
        items.push(OrderItem {
            product_id,
            quantity: item.quantity,
            price_cents_at_time: product.price_cents,
        });
    }

    let input = NewOrder {
        user_id: principal.id,
        items,
    };
    if let Err(e) = input.validate() {
        restore_stock(&services, &taken).await;
        return envelope::domain_error(e);
    }

    let order = match services.orders.create(input).await {
        Ok(order) => order,
        Err(e) => {
            restore_stock(&services, &taken).await;
            return envelope::store_error(e);
        }
    };

    tracing::info!(order_id = %order.id, by = %principal.id, "order placed");
    envelope::created("Order placed", dto::order_to_json(&order))
}

/// Put back stock taken by a partially-resolved order.
async fn restore_stock(services: &AppServices, taken: &[(ProductId, u32)]) {
    for &(product_id, quantity) in taken {
        if let Err(e) = services.products.adjust_stock(product_id, i64::from(quantity)).await {
            tracing::error!(%product_id, error = %e, "stock restore failed");
        }
    }
}

pub async fn my_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if let Err(e) = VIEW_OWN.authorize(&principal) {
        return envelope::auth_error(&e);
    }
    match services.orders.list_by_user(principal.id).await {
        Ok(orders) => envelope::ok(serde_json::json!({
            "orders": orders.iter().map(dto::order_to_json).collect::<Vec<_>>(),
        })),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    // Verification gate before the lookup: an unverified caller must not
    // learn whether the order exists.
    if let Err(e) = VIEW_INSTANCE.check_verification(&principal) {
        return envelope::auth_error(&e);
    }

    let id: OrderId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    let order = match services.orders.find_by_id(id).await {
        Ok(Some(order)) => order,
        Ok(None) => return envelope::not_found("Order"),
        Err(e) => return envelope::store_error(e),
    };

    if let Err(e) = VIEW_INSTANCE.authorize_owned(&principal, order.user_id) {
        return envelope::auth_error(&e);
    }

    envelope::ok(dto::order_to_json(&order))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<dto::ListOrdersQuery>,
) -> axum::response::Response {
    if let Err(e) = LIST_ALL.authorize(&principal) {
        return envelope::auth_error(&e);
    }

    let status = match query.status.as_deref().map(str::parse::<OrderStatus>).transpose() {
        Ok(status) => status,
        Err(e) => return envelope::domain_error(e),
    };

    match services.orders.list(status).await {
        Ok(orders) => envelope::ok(serde_json::json!({
            "orders": orders.iter().map(dto::order_to_json).collect::<Vec<_>>(),
        })),
        Err(e) => envelope::store_error(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderStatusRequest>,
) -> axum::response::Response {
    if let Err(e) = SET_STATUS.authorize(&principal) {
        return envelope::auth_error(&e);
    }
    let id: OrderId = match id.parse() {
        Ok(id) => id,
        Err(e) => return envelope::domain_error(e),
    };

    // Status strings are validated before any lookup or write.
    let status: OrderStatus = match body.status.parse() {
        Ok(status) => status,
        Err(e) => return envelope::domain_error(e),
    };

    match services.orders.update_status(id, status).await {
        Ok(order) => {
            tracing::info!(order_id = %id, by = %principal.id, status = status.as_str(), "order status updated");
            envelope::ok_message("Order status updated", Some(dto::order_to_json(&order)))
        }
        Err(e) => envelope::store_error(e),
    }
}
