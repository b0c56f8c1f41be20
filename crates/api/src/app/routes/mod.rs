pub mod auth;
pub mod categories;
pub mod orders;
pub mod permissions;
pub mod products;
pub mod reviews;
pub mod system;
pub mod users;
