//! Order boundary.
//!
//! Orders belong to the host shop; the gateway core only reads their
//! id/total/currency and drives status transitions through the
//! `OrderStore` trait. The store owns the concurrency discipline: the
//! paid transition is a compare-and-set so that duplicate callback
//! delivery cannot double-credit an order, and every other transition
//! refuses to touch an order that has already reached Paid.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::GatewayResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Declined,
    Errored,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Declined => "declined",
            OrderStatus::Errored => "errored",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "declined" => Some(OrderStatus::Declined),
            "errored" => Some(OrderStatus::Errored),
            _ => None,
        }
    }
}

/// Snapshot of a shop order as the gateway sees it
#[derive(Debug, Clone)]
pub struct Order {
    pub id: u64,
    pub total: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    /// Where the customer lands after a completed payment
    pub return_url: String,
    /// Payment page to send the customer back to on decline/error
    pub retry_url: String,
    /// Where the customer lands after abandoning the redirect page
    pub cancel_url: String,
}

/// Mutation surface the host shop exposes to the gateway
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_order(&self, order_id: u64) -> GatewayResult<Option<Order>>;

    /// Transition to Paid only if the order is still pending. Returns
    /// whether this call performed the transition; a `false` on an
    /// already-paid order is the idempotent no-op path.
    async fn mark_paid_if_pending(&self, order_id: u64) -> GatewayResult<bool>;

    /// Transition to a non-paid status. Paid is terminal: the store
    /// must leave an already-paid order untouched even if a concurrent
    /// approval landed after the caller loaded the order.
    async fn set_status_unless_paid(&self, order_id: u64, status: OrderStatus)
        -> GatewayResult<()>;

    /// Append a permanent audit note to the order log
    async fn add_note(&self, order_id: u64, note: &str) -> GatewayResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Declined,
            OrderStatus::Errored,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_unknown_status_is_none() {
        assert_eq!(OrderStatus::from_str("on-hold"), None);
    }
}
