use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use storefront_catalog::{Category, CategoryUpdate, NewCategory};
use storefront_core::CategoryId;

use crate::error::StoreError;

/// Narrow persistence interface for categories.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create(&self, input: NewCategory) -> Result<Category, StoreError>;
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;
    async fn list(&self) -> Result<Vec<Category>, StoreError>;
    async fn update(&self, id: CategoryId, update: CategoryUpdate) -> Result<Category, StoreError>;
    async fn delete(&self, id: CategoryId) -> Result<(), StoreError>;
}

/// In-memory category store. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCategoryStore {
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<CategoryId, Category>>, StoreError> {
        self.categories
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<CategoryId, Category>>, StoreError> {
        self.categories
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn create(&self, input: NewCategory) -> Result<Category, StoreError> {
        let mut categories = self.write()?;
        if categories.values().any(|c| c.name == input.name) {
            return Err(StoreError::conflict(
                "Category with this name already exists",
            ));
        }
        let category = Category {
            id: CategoryId::new(),
            name: input.name,
            description: input.description,
            created_by: input.created_by,
            created_at: Utc::now(),
        };
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories: Vec<Category> = self.read()?.values().cloned().collect();
        categories.sort_by_key(|c| c.created_at);
        Ok(categories)
    }

    async fn update(&self, id: CategoryId, update: CategoryUpdate) -> Result<Category, StoreError> {
        let mut categories = self.write()?;
        let category = categories.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(description) = update.description {
            category.description = description;
        }
        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> Result<(), StoreError> {
        self.write()?
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::UserId;

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let store = InMemoryCategoryStore::new();
        let input = NewCategory {
            name: "Electronics".into(),
            description: String::new(),
            created_by: UserId::new(),
        };
        store.create(input.clone()).await.unwrap();
        let err = store.create(input).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
