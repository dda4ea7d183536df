//! Scheduling context.
//!
//! Replaces the source system's ambient "current customer / company / time
//! zone" accessors with one explicit value resolved per request and threaded
//! into every calculator call.

use jiff::{Timestamp, Zoned, civil::Date, tz::TimeZone};
use thiserror::Error;

use crate::{
    CompanyUuid, CustomerUuid,
    directory::{Company, Customer, Directory, DirectoryError},
    timezone::resolve_time_zone,
};

/// System default for how many days ahead delivery may be scheduled.
pub const DEFAULT_ORDER_AHEAD_DAYS: i16 = 14;

/// Errors raised while resolving a [`SchedulingContext`].
#[derive(Debug, Error)]
pub enum ContextError {
    /// A directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Who is asking, as of when, in which zone, and how far ahead they may book.
#[derive(Debug, Clone)]
pub struct SchedulingContext {
    /// The requesting customer.
    pub customer: CustomerUuid,
    /// The customer's company affiliation, if any.
    pub company: Option<CompanyUuid>,
    /// The current instant, projected into the customer's effective zone.
    pub now: Zoned,
    /// Horizon for order-ahead scheduling, in days.
    pub order_ahead_days: i16,
}

impl SchedulingContext {
    /// Resolves the context for a customer from the directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ContextError`] when a customer or company lookup fails.
    pub async fn resolve(
        directory: &dyn Directory,
        customer: CustomerUuid,
        now: Timestamp,
    ) -> Result<Self, ContextError> {
        let customer = directory.customer(customer).await?;

        let company = match customer.company {
            Some(uuid) => directory.company(uuid).await?,
            None => None,
        };

        Ok(Self::from_records(&customer, company.as_ref(), now))
    }

    /// Builds the context from already-loaded records.
    pub fn from_records(customer: &Customer, company: Option<&Company>, now: Timestamp) -> Self {
        let tz = resolve_time_zone(customer, company);

        let order_ahead_days = company
            .and_then(|company| company.profile.order_ahead_days)
            .unwrap_or(DEFAULT_ORDER_AHEAD_DAYS)
            .max(0);

        Self {
            customer: customer.uuid,
            company: company.map(|company| company.uuid),
            now: now.to_zoned(tz),
            order_ahead_days,
        }
    }

    /// The effective time zone the context was resolved in.
    pub fn time_zone(&self) -> &TimeZone {
        self.now.time_zone()
    }

    /// The current calendar day in the effective zone.
    pub fn today(&self) -> Date {
        self.now.date()
    }
}
