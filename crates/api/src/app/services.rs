//! Service wiring: one immutable bundle of collaborators per process.

use std::sync::Arc;

use storefront_auth::{PasswordHasher, RolePolicy, TokenService};
use storefront_infra::{
    CategoryStore, EmailSender, InMemoryCategoryStore, InMemoryOrderStore, InMemoryProductStore,
    InMemoryReviewStore, InMemoryUserStore, OrderStore, Pbkdf2PasswordHasher, ProductStore,
    ReviewStore, TracingEmailSender, UserStore,
};

/// Everything the handlers need, constructed once at startup and shared by
/// reference. The role policy is immutable for the life of the process.
pub struct AppServices {
    pub policy: RolePolicy,
    pub tokens: TokenService,
    pub passwords: Arc<dyn PasswordHasher>,
    pub email: Arc<dyn EmailSender>,
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub orders: Arc<dyn OrderStore>,
    pub reviews: Arc<dyn ReviewStore>,
}

/// Default wiring: in-memory stores, PBKDF2 hashing, log-only mail.
pub fn build_services(jwt_secret: String) -> AppServices {
    AppServices {
        policy: RolePolicy::standard(),
        tokens: TokenService::new(jwt_secret.as_bytes()),
        passwords: Arc::new(Pbkdf2PasswordHasher::new()),
        email: Arc::new(TracingEmailSender),
        users: Arc::new(InMemoryUserStore::new()),
        products: Arc::new(InMemoryProductStore::new()),
        categories: Arc::new(InMemoryCategoryStore::new()),
        orders: Arc::new(InMemoryOrderStore::new()),
        reviews: Arc::new(InMemoryReviewStore::new()),
    }
}
