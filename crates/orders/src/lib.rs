//! `storefront-orders` — customer order records.

pub mod order;

pub use order::{NewOrder, Order, OrderItem, OrderStatus};
