//! Company daily allowance.
//!
//! One shared ledger computes a company's per-day spend and remaining
//! allowance; both the payment-option visibility check and the capture-time
//! authorization consume the same formula.

mod history;
mod ledger;
mod models;

pub use history::{MockOrderHistory, OrderHistory, OrderHistoryError};
pub use ledger::{AllowanceError, AllowanceLedger, company_limit, daily_spend, remaining_allowance};
pub use models::{AllowanceState, CaptureDecision, OrderRecord, OrderStatus, PaymentStatus};
