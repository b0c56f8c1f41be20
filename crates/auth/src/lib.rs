//! `storefront-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: the policy
//! functions take already-resolved principals and ownership facts and return
//! typed results, so the same decisions are testable without a server.

pub mod capability;
pub mod error;
pub mod password;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use capability::Capability;
pub use error::AuthError;
pub use password::PasswordHasher;
pub use policy::{
    authorize_deactivation, authorize_role_change, can_access_owned, role_allowed, RolePolicy,
};
pub use principal::Principal;
pub use roles::Role;
pub use token::{TokenEncodeError, TokenService};
pub use user::{NewUser, User};
