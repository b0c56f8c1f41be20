use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use storefront_core::{ProductId, ReviewId, UserId};
use storefront_reviews::{NewReview, RatingSummary, Review, ReviewUpdate};

use crate::error::StoreError;

/// Narrow persistence interface for reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Create a review. One review per user per product; a second attempt
    /// fails with `Conflict`.
    async fn create(&self, input: NewReview) -> Result<Review, StoreError>;

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, StoreError>;
    async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<Review>, StoreError>;
    async fn rating_summary(&self, product_id: ProductId) -> Result<RatingSummary, StoreError>;
    async fn update(&self, id: ReviewId, update: ReviewUpdate) -> Result<Review, StoreError>;
    async fn delete(&self, id: ReviewId) -> Result<Review, StoreError>;
}

/// In-memory review store. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryReviewStore {
    reviews: RwLock<HashMap<ReviewId, Review>>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ReviewId, Review>>, StoreError> {
        self.reviews
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<ReviewId, Review>>, StoreError> {
        self.reviews
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn author_key(user_id: UserId, product_id: ProductId) -> (UserId, ProductId) {
        (user_id, product_id)
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn create(&self, input: NewReview) -> Result<Review, StoreError> {
        let mut reviews = self.write()?;
        let key = Self::author_key(input.user_id, input.product_id);
        if reviews
            .values()
            .any(|r| Self::author_key(r.user_id, r.product_id) == key)
        {
            return Err(StoreError::conflict(
                "You have already reviewed this product",
            ));
        }
        let review = Review {
            id: ReviewId::new(),
            product_id: input.product_id,
            user_id: input.user_id,
            text: input.text,
            rating: input.rating,
            created_at: Utc::now(),
        };
        reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<Review>, StoreError> {
        let mut reviews: Vec<Review> = self
            .read()?
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.created_at);
        Ok(reviews)
    }

    async fn rating_summary(&self, product_id: ProductId) -> Result<RatingSummary, StoreError> {
        let ratings: Vec<u8> = self
            .read()?
            .values()
            .filter(|r| r.product_id == product_id)
            .map(|r| r.rating)
            .collect();
        Ok(RatingSummary::from_ratings(ratings))
    }

    async fn update(&self, id: ReviewId, update: ReviewUpdate) -> Result<Review, StoreError> {
        let mut reviews = self.write()?;
        let review = reviews.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(text) = update.text {
            review.text = text;
        }
        if let Some(rating) = update.rating {
            review.rating = rating;
        }
        Ok(review.clone())
    }

    async fn delete(&self, id: ReviewId) -> Result<Review, StoreError> {
        self.write()?.remove(&id).ok_or(StoreError::NotFound)
    }
}
