use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use storefront_catalog::{NewProduct, Product, ProductUpdate};
use storefront_core::{CategoryId, ProductId};

use crate::error::StoreError;

/// Narrow persistence interface for products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, input: NewProduct) -> Result<Product, StoreError>;
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
    async fn list_by_category(&self, category_id: CategoryId) -> Result<Vec<Product>, StoreError>;
    async fn update(&self, id: ProductId, update: ProductUpdate) -> Result<Product, StoreError>;
    async fn delete(&self, id: ProductId) -> Result<Product, StoreError>;

    /// Apply a stock delta as one atomic check-and-write. A negative delta
    /// that would take the level below zero fails with `Conflict` and leaves
    /// the row untouched, so concurrent orders cannot oversell.
    async fn adjust_stock(&self, id: ProductId, delta: i64) -> Result<Product, StoreError>;

    async fn count_in_category(&self, category_id: CategoryId) -> Result<usize, StoreError>;
}

/// In-memory product store. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ProductId, Product>>, StoreError> {
        self.products
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<ProductId, Product>>, StoreError> {
        self.products
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, input: NewProduct) -> Result<Product, StoreError> {
        let product = Product {
            id: ProductId::new(),
            name: input.name,
            description: input.description,
            category_id: input.category_id,
            price_cents: input.price_cents,
            stock_quantity: input.stock_quantity,
            created_by: input.created_by,
            created_at: Utc::now(),
        };
        self.write()?.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self.read()?.values().cloned().collect();
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    async fn list_by_category(&self, category_id: CategoryId) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self
            .read()?
            .values()
            .filter(|p| p.category_id == category_id)
            .cloned()
            .collect();
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    async fn update(&self, id: ProductId, update: ProductUpdate) -> Result<Product, StoreError> {
        let mut products = self.write()?;
        let product = products.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(category_id) = update.category_id {
            product.category_id = category_id;
        }
        if let Some(price_cents) = update.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(stock_quantity) = update.stock_quantity {
            product.stock_quantity = stock_quantity;
        }
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<Product, StoreError> {
        self.write()?.remove(&id).ok_or(StoreError::NotFound)
    }

    async fn adjust_stock(&self, id: ProductId, delta: i64) -> Result<Product, StoreError> {
        let mut products = self.write()?;
        let product = products.get_mut(&id).ok_or(StoreError::NotFound)?;
        let next = i64::from(product.stock_quantity) + delta;
        let next = u32::try_from(next).map_err(|_| StoreError::conflict("insufficient stock"))?;
        product.stock_quantity = next;
        Ok(product.clone())
    }

    async fn count_in_category(&self, category_id: CategoryId) -> Result<usize, StoreError> {
        Ok(self
            .read()?
            .values()
            .filter(|p| p.category_id == category_id)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::UserId;

    fn new_product(category_id: CategoryId) -> NewProduct {
        NewProduct {
            name: "Keyboard".into(),
            description: String::new(),
            category_id,
            price_cents: 4999,
            stock_quantity: 10,
            created_by: UserId::new(),
        }
    }

    #[tokio::test]
    async fn adjust_stock_applies_deltas_and_refuses_going_negative() {
        let store = InMemoryProductStore::new();
        let product = store.create(new_product(CategoryId::new())).await.unwrap();

        let updated = store.adjust_stock(product.id, -7).await.unwrap();
        assert_eq!(updated.stock_quantity, 3);

        // A delta that would go below zero fails and leaves the row alone.
        let err = store.adjust_stock(product.id, -4).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        let found = store.find_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(found.stock_quantity, 3);

        let restored = store.adjust_stock(product.id, 7).await.unwrap();
        assert_eq!(restored.stock_quantity, 10);
    }

    #[tokio::test]
    async fn concurrent_decrements_cannot_oversell() {
        let store = InMemoryProductStore::new();
        let product = store.create(new_product(CategoryId::new())).await.unwrap();

        // Stock 10; two decrements of 7 can only both pass a check-then-write
        // scheme. Exactly one must succeed.
        let (a, b) = tokio::join!(
            store.adjust_stock(product.id, -7),
            store.adjust_stock(product.id, -7),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let found = store.find_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(found.stock_quantity, 3);
    }

    #[tokio::test]
    async fn list_by_category_filters() {
        let store = InMemoryProductStore::new();
        let cat_a = CategoryId::new();
        let cat_b = CategoryId::new();
        store.create(new_product(cat_a)).await.unwrap();
        store.create(new_product(cat_a)).await.unwrap();
        store.create(new_product(cat_b)).await.unwrap();

        assert_eq!(store.list_by_category(cat_a).await.unwrap().len(), 2);
        assert_eq!(store.count_in_category(cat_b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_missing_product_is_not_found() {
        let store = InMemoryProductStore::new();
        let err = store.delete(ProductId::new()).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }
}
