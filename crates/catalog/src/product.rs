use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, ProductId, UserId};

/// A catalog product.
///
/// `created_by` is the ownership fact the authorization layer consults for
/// owner-or-role decisions; it never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    /// Price in the smallest currency unit (e.g. cents).
    pub price_cents: u64,
    pub stock_quantity: u32,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub price_cents: u64,
    pub stock_quantity: u32,
    pub created_by: UserId,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(())
    }
}

/// Partial update for a product. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price_cents: Option<u64>,
    pub stock_quantity: Option<u32>,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("product name cannot be empty"));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.price_cents.is_none()
            && self.stock_quantity.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        let input = NewProduct {
            name: "  ".into(),
            description: String::new(),
            category_id: CategoryId::new(),
            price_cents: 999,
            stock_quantity: 1,
            created_by: UserId::new(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn in_stock_follows_quantity() {
        let mut product = Product {
            id: ProductId::new(),
            name: "Keyboard".into(),
            description: String::new(),
            category_id: CategoryId::new(),
            price_cents: 4999,
            stock_quantity: 3,
            created_by: UserId::new(),
            created_at: Utc::now(),
        };
        assert!(product.in_stock());
        product.stock_quantity = 0;
        assert!(!product.in_stock());
    }
}
