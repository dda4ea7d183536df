//! Allowance models.

use jiff::{Timestamp, Zoned};
use rust_decimal::Decimal;

use crate::OrderUuid;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Placed but not yet confirmed.
    Pending,
    /// Confirmed for delivery.
    Confirmed,
    /// Cancelled; never counts against the allowance.
    Cancelled,
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Not captured yet.
    Unpaid,
    /// Captured against the company allowance.
    Paid,
}

/// An order as the allowance ledger sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// The order's identifier.
    pub uuid: OrderUuid,
    /// Order total, in the store's currency.
    pub total: Decimal,
    /// The delivery time the order is scheduled for.
    pub scheduled_for: Zoned,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Payment status.
    pub payment: PaymentStatus,
    /// Soft-deletion marker.
    pub deleted_at: Option<Timestamp>,
}

/// Derived allowance view for one customer's company and day.
///
/// Never persisted: recomputed from order history on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceState {
    /// The company's daily cap (zero without a company, or for an
    /// allowance-exempt customer).
    pub limit: Decimal,
    /// Paid, non-cancelled spend already scheduled for the day.
    pub spent: Decimal,
    /// Budget left for the day, clamped at zero.
    pub remaining: Decimal,
}

/// Result of attempting to capture an order against the allowance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureDecision {
    /// The order fit the remaining budget and was marked paid.
    Approved {
        /// Budget left after this order.
        remaining: Decimal,
    },
    /// The order exceeded the remaining budget and was not paid.
    Rejected {
        /// The order total that was attempted.
        attempted: Decimal,
        /// Budget that was left for the day.
        remaining: Decimal,
        /// How far over budget the attempt was.
        shortfall: Decimal,
    },
}

impl CaptureDecision {
    /// Whether the capture went through.
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }

    /// The message shown to a rejected customer, naming the shortfall.
    pub fn rejection_message(&self) -> Option<String> {
        match self {
            Self::Approved { .. } => None,
            Self::Rejected {
                attempted,
                remaining,
                shortfall,
            } => Some(format!(
                "Order total {attempted} exceeds the remaining daily allowance {remaining} by {shortfall}."
            )),
        }
    }
}
