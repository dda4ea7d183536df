//! Order history seam.

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;
use thiserror::Error;

use crate::{CustomerUuid, OrderUuid, StoreUuid, allowance::models::OrderRecord};

/// Errors raised by an [`OrderHistory`] backend.
#[derive(Debug, Error)]
pub enum OrderHistoryError {
    /// The order id does not resolve to a record.
    #[error("order not found")]
    OrderNotFound,

    /// The backing store failed.
    #[error("order history backend error: {0}")]
    Backend(String),
}

/// Search and payment-marking seam over historical orders.
#[automock]
#[async_trait]
pub trait OrderHistory: Send + Sync {
    /// The customer's orders in this store scheduled for the given day,
    /// regardless of status. The ledger applies the spend formula on top.
    async fn orders_for_day(
        &self,
        customer: CustomerUuid,
        store: StoreUuid,
        date: Date,
    ) -> Result<Vec<OrderRecord>, OrderHistoryError>;

    /// Marks an order as paid.
    async fn mark_paid(&self, order: OrderUuid) -> Result<(), OrderHistoryError>;
}
