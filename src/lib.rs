//! Canteen
//!
//! Canteen is the scheduling and spending core of an order-ahead food storefront:
//! it computes which delivery time slots are currently orderable per customer and
//! time zone, validates a customer's stored slot choice against live availability,
//! and enforces a company's shared daily spending allowance across every order
//! placed that day.
//!
//! Persistence, transport and rendering stay outside the crate; collaborators are
//! reached through the [`directory::Directory`], [`allowance::OrderHistory`] and
//! [`selection::SelectionStore`] seams.

pub mod allowance;
pub mod context;
pub mod directory;
pub mod fixtures;
pub mod schedule;
pub mod selection;
pub mod slots;
pub mod timezone;

mod uuids;

pub use uuids::{CompanyUuid, CustomerUuid, OrderUuid, StoreUuid};
