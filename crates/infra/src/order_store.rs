use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use storefront_core::{OrderId, UserId};
use storefront_orders::{NewOrder, Order, OrderStatus};

use crate::error::StoreError;

/// Narrow persistence interface for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, input: NewOrder) -> Result<Order, StoreError>;
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError>;
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, StoreError>;
}

/// In-memory order store. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<OrderId, Order>>, StoreError> {
        self.orders
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<OrderId, Order>>, StoreError> {
        self.orders
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, input: NewOrder) -> Result<Order, StoreError> {
        let order = Order {
            id: OrderId::new(),
            user_id: input.user_id,
            amount_cents: input.amount_cents(),
            items: input.items,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.write()?.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .read()?
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .read()?
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        let mut orders = self.write()?;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        order.status = status;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::ProductId;
    use storefront_orders::OrderItem;

    fn new_order(user_id: UserId) -> NewOrder {
        NewOrder {
            user_id,
            items: vec![OrderItem {
                product_id: ProductId::new(),
                quantity: 2,
                price_cents_at_time: 1000,
            }],
        }
    }

    #[tokio::test]
    async fn created_order_is_pending_with_derived_amount() {
        let store = InMemoryOrderStore::new();
        let order = store.create(new_order(UserId::new())).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.amount_cents, 2000);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let store = InMemoryOrderStore::new();
        let first = store.create(new_order(UserId::new())).await.unwrap();
        store.create(new_order(UserId::new())).await.unwrap();

        store
            .update_status(first.id, OrderStatus::Shipped)
            .await
            .unwrap();

        assert_eq!(store.list(None).await.unwrap().len(), 2);
        assert_eq!(
            store.list(Some(OrderStatus::Shipped)).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn list_by_user_returns_own_orders_only() {
        let store = InMemoryOrderStore::new();
        let owner = UserId::new();
        store.create(new_order(owner)).await.unwrap();
        store.create(new_order(UserId::new())).await.unwrap();

        let orders = store.list_by_user(owner).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].user_id, owner);
    }
}
