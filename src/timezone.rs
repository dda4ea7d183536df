//! Effective time-zone resolution.

use jiff::tz::TimeZone;
use tracing::warn;

use crate::directory::{Company, Customer};

/// Resolves the effective time zone for a customer.
///
/// A company-wide override wins, so every member of that company sees an
/// identical delivery calendar regardless of individual locale; otherwise the
/// customer's personal zone applies. An unresolvable identifier (or no zone at
/// all) falls back to UTC — slot calculation must never abort on a bad zone.
pub fn resolve_time_zone(customer: &Customer, company: Option<&Company>) -> TimeZone {
    let name = company
        .and_then(|company| company.profile.time_zone.as_deref())
        .or(customer.time_zone.as_deref());

    let Some(name) = name else {
        return TimeZone::UTC;
    };

    match TimeZone::get(name) {
        Ok(tz) => tz,
        Err(error) => {
            warn!(%error, time_zone = name, "unresolvable time zone, falling back to UTC");
            TimeZone::UTC
        }
    }
}
