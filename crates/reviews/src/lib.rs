//! `storefront-reviews` — product review records.

pub mod review;

pub use review::{NewReview, RatingSummary, Review, ReviewUpdate};
