//! `storefront-catalog` — product and category records.

pub mod category;
pub mod product;

pub use category::{Category, CategoryUpdate, NewCategory};
pub use product::{NewProduct, Product, ProductUpdate};
