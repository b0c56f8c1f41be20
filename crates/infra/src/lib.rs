//! `storefront-infra` — storage and outbound-service implementations.
//!
//! Persistence is consumed through narrow async store traits; the provided
//! implementations are in-memory (`RwLock<HashMap>`), sufficient for this
//! design's single-row read/update model. Each store method is an atomic
//! operation; no multi-row transactions are offered, last-write-wins.

pub mod category_store;
pub mod email;
pub mod error;
pub mod order_store;
pub mod password;
pub mod product_store;
pub mod review_store;
pub mod user_store;

pub use category_store::{CategoryStore, InMemoryCategoryStore};
pub use email::{EmailSender, TracingEmailSender};
pub use error::StoreError;
pub use order_store::{InMemoryOrderStore, OrderStore};
pub use password::Pbkdf2PasswordHasher;
pub use product_store::{InMemoryProductStore, ProductStore};
pub use review_store::{InMemoryReviewStore, ReviewStore};
pub use user_store::{InMemoryUserStore, ProfileUpdate, UserStore};
