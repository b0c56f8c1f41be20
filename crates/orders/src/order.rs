use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, OrderId, ProductId, UserId};

/// Order lifecycle status. Closed set; unknown strings are rejected at the
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "invalid status '{other}'"
            ))),
        }
    }
}

/// A line of an order, with the price snapshotted at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_cents_at_time: u64,
}

/// A customer order.
///
/// `user_id` is the ownership fact consulted for owner-or-role access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub amount_cents: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an order. Amount is derived from the items, never
/// client-supplied.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::validation("order items are required"));
        }
        if self.items.iter().any(|item| item.quantity == 0) {
            return Err(DomainError::validation("item quantity must be positive"));
        }
        Ok(())
    }

    pub fn amount_cents(&self) -> u64 {
        self.items
            .iter()
            .map(|item| item.price_cents_at_time * u64::from(item.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn empty_order_is_rejected() {
        let order = NewOrder {
            user_id: UserId::new(),
            items: vec![],
        };
        assert!(order.validate().is_err());
    }

    #[test]
    fn amount_sums_snapshotted_prices() {
        let order = NewOrder {
            user_id: UserId::new(),
            items: vec![
                OrderItem {
                    product_id: ProductId::new(),
                    quantity: 2,
                    price_cents_at_time: 1500,
                },
                OrderItem {
                    product_id: ProductId::new(),
                    quantity: 1,
                    price_cents_at_time: 999,
                },
            ],
        };
        assert_eq!(order.amount_cents(), 3999);
    }
}
