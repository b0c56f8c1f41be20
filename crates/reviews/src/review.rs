use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, ProductId, ReviewId, UserId};

/// Valid rating bounds, inclusive.
pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;

/// A product review.
///
/// `user_id` is the ownership fact consulted for owner-or-role access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub text: String,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

/// Aggregated rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    pub fn from_ratings<I: IntoIterator<Item = u8>>(ratings: I) -> Self {
        let ratings: Vec<u8> = ratings.into_iter().collect();
        let count = ratings.len();
        let average = if count == 0 {
            0.0
        } else {
            ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / count as f64
        };
        Self { average, count }
    }
}

/// Input for creating a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub text: String,
    pub rating: u8,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::validation("review text cannot be empty"));
        }
        validate_rating(self.rating)
    }
}

/// Partial update for a review.
#[derive(Debug, Clone, Default)]
pub struct ReviewUpdate {
    pub text: Option<String>,
    pub rating: Option<u8>,
}

impl ReviewUpdate {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        if let Some(text) = &self.text {
            if text.trim().is_empty() {
                return Err(DomainError::validation("review text cannot be empty"));
            }
        }
        Ok(())
    }
}

pub fn validate_rating(rating: u8) -> Result<(), DomainError> {
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(DomainError::validation(format!(
            "rating must be between {RATING_MIN} and {RATING_MAX}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn summary_averages_ratings() {
        let summary = RatingSummary::from_ratings([5, 4, 3]);
        assert_eq!(summary.count, 3);
        assert!((summary.average - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_of_no_ratings_is_zero() {
        let summary = RatingSummary::from_ratings([]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, 0.0);
    }
}
