//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (stores, token service, policy)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs
//! - `envelope.rs`: the JSON response envelope and error mapping

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::middleware;

pub mod dto;
pub mod envelope;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: String) -> Router {
    build_app_with_services(Arc::new(services::build_services(jwt_secret)))
}

/// Router over explicit services; tests use this to pre-seed stores.
pub fn build_app_with_services(services: Arc<services::AppServices>) -> Router {
    let public = Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::public_router())
        .nest("/products", routes::products::public_router())
        .nest("/categories", routes::categories::public_router())
        .nest("/reviews", routes::reviews::public_router());

    let protected = Router::new()
        .nest("/auth", routes::auth::protected_router())
        .nest("/users", routes::users::router())
        .nest("/products", routes::products::protected_router())
        .nest("/categories", routes::categories::protected_router())
        .nest("/orders", routes::orders::router())
        .nest("/reviews", routes::reviews::protected_router())
        .nest("/permissions", routes::permissions::router())
        .layer(axum::middleware::from_fn_with_state(
            services.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(Extension(services))
}
