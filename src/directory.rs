//! Customer & company directory.
//!
//! The source system read the "current" customer, company and store settings
//! from ambient request state; here they are explicit records behind one lookup
//! seam so every calculator receives exactly the data it was resolved against.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{CompanyUuid, CustomerUuid, StoreUuid};

/// Errors raised by a [`Directory`] backend.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The customer id does not resolve to a record.
    #[error("customer not found")]
    CustomerNotFound,

    /// The backing store failed.
    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Customer record.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    /// The customer's identifier.
    pub uuid: CustomerUuid,
    /// Company affiliation, if any.
    pub company: Option<CompanyUuid>,
    /// The customer's personal IANA time-zone identifier.
    pub time_zone: Option<String>,
    /// Whether the customer holds the allowance-exempt role.
    pub allowance_exempt: bool,
}

/// Per-company scheduling overrides. Absent fields fall back to the
/// customer's personal zone and the system default horizon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulingProfile {
    /// Company-wide IANA time-zone override.
    pub time_zone: Option<String>,
    /// Maximum number of days ahead members may schedule delivery.
    pub order_ahead_days: Option<i16>,
}

/// Company record.
#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    /// The company's identifier.
    pub uuid: CompanyUuid,
    /// Scheduling overrides applied to every member.
    pub profile: SchedulingProfile,
    /// The shared daily spending cap for the whole company.
    pub daily_limit: Decimal,
}

/// Lookup seam over customer, company and store-setting records.
#[automock]
#[async_trait]
pub trait Directory: Send + Sync {
    /// Looks up a customer record.
    async fn customer(&self, uuid: CustomerUuid) -> Result<Customer, DirectoryError>;

    /// Looks up a company record.
    async fn company(&self, uuid: CompanyUuid) -> Result<Option<Company>, DirectoryError>;

    /// The store's delivery-schedule setting, if one is configured.
    async fn delivery_schedule(&self, store: StoreUuid) -> Result<Option<String>, DirectoryError>;
}
