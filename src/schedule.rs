//! Slot availability.
//!
//! Enumerates which delivery slots are orderable for a customer given the
//! current instant in their effective zone: today's slots obey the order
//! cutoff, future days within the horizon offer the full catalog, and the
//! past offers nothing.

use jiff::{
    SignedDuration, Span, Zoned,
    civil::{Date, Time},
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{context::SchedulingContext, slots::SlotCatalog};

/// Tolerance when matching a stored selection against a freshly computed
/// slot. Absorbs precision drift between a persisted timestamp and the
/// recomputed delivery time.
pub const SELECTION_TOLERANCE: SignedDuration = SignedDuration::from_secs(60);

/// Errors raised by availability calculations.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Calendar arithmetic left the representable range.
    #[error("date out of range")]
    DateOutOfRange(#[source] jiff::Error),
}

/// The delivery times orderable on `date`, ascending.
///
/// On the current day a slot is available iff `now` has not passed its cutoff
/// (cutoff inclusive); once the cutoff passes the slot disappears even though
/// its delivery time is still in the future. Future dates offer every catalog
/// slot; past dates offer none.
///
/// # Errors
///
/// Returns a [`ScheduleError`] when a civil date/time cannot be projected
/// into the context's zone.
pub fn slots_for_date(
    catalog: &SlotCatalog,
    date: Date,
    ctx: &SchedulingContext,
) -> Result<SmallVec<[Zoned; 4]>, ScheduleError> {
    let today = ctx.today();
    let mut deliveries = SmallVec::new();

    if date < today {
        return Ok(deliveries);
    }

    for slot in catalog {
        if date == today {
            let cutoff = zoned_at(date, slot.cutoff, ctx)?;

            if ctx.now.timestamp() > cutoff.timestamp() {
                continue;
            }
        }

        deliveries.push(zoned_at(date, slot.delivery, ctx)?);
    }

    Ok(deliveries)
}

/// Every orderable delivery time from today through the context's horizon,
/// ascending.
///
/// # Errors
///
/// Returns a [`ScheduleError`] when calendar arithmetic overflows.
pub fn slots_for_horizon(
    catalog: &SlotCatalog,
    ctx: &SchedulingContext,
) -> Result<Vec<Zoned>, ScheduleError> {
    let mut all = Vec::new();

    for offset in 0..=i64::from(ctx.order_ahead_days) {
        let date = ctx
            .today()
            .checked_add(Span::new().days(offset))
            .map_err(ScheduleError::DateOutOfRange)?;

        all.extend(slots_for_date(catalog, date, ctx)?);
    }

    Ok(all)
}

/// Whether `candidate` is a currently orderable delivery time.
///
/// False beyond the horizon or before `now`; otherwise true iff the candidate
/// lands within [`SELECTION_TOLERANCE`] of a slot computed for its date.
///
/// # Errors
///
/// Returns a [`ScheduleError`] when calendar arithmetic overflows.
pub fn is_available(
    catalog: &SlotCatalog,
    candidate: &Zoned,
    ctx: &SchedulingContext,
) -> Result<bool, ScheduleError> {
    let horizon_end = ctx
        .today()
        .checked_add(Span::new().days(i64::from(ctx.order_ahead_days)))
        .map_err(ScheduleError::DateOutOfRange)?;

    let candidate = candidate.timestamp().to_zoned(ctx.time_zone().clone());

    if candidate.date() > horizon_end {
        return Ok(false);
    }

    if candidate.timestamp() < ctx.now.timestamp() {
        return Ok(false);
    }

    let slots = slots_for_date(catalog, candidate.date(), ctx)?;

    Ok(slots.iter().any(|slot| {
        candidate
            .timestamp()
            .duration_since(slot.timestamp())
            .abs()
            <= SELECTION_TOLERANCE
    }))
}

fn zoned_at(date: Date, time: Time, ctx: &SchedulingContext) -> Result<Zoned, ScheduleError> {
    date.to_datetime(time)
        .to_zoned(ctx.time_zone().clone())
        .map_err(ScheduleError::DateOutOfRange)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use crate::fixtures::{lunch_dinner_catalog, scheduling_context, utc};

    use super::*;

    #[test]
    fn morning_offers_both_slots_today() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(10, 30, 0, 0)), 14);
        let catalog = lunch_dinner_catalog();

        let slots = slots_for_date(&catalog, date(2026, 8, 7), &ctx)?;

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0], utc(date(2026, 8, 7).at(13, 0, 0, 0)));
        assert_eq!(slots[1], utc(date(2026, 8, 7).at(19, 0, 0, 0)));

        Ok(())
    }

    #[test]
    fn past_lunch_cutoff_only_dinner_remains_today() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(11, 30, 0, 0)), 14);
        let catalog = lunch_dinner_catalog();

        let slots = slots_for_date(&catalog, date(2026, 8, 7), &ctx)?;

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0], utc(date(2026, 8, 7).at(19, 0, 0, 0)));

        Ok(())
    }

    #[test]
    fn membership_flips_exactly_at_the_cutoff() -> TestResult {
        let catalog = lunch_dinner_catalog();

        let at_cutoff = scheduling_context(utc(date(2026, 8, 7).at(11, 0, 0, 0)), 14);
        let just_past = scheduling_context(utc(date(2026, 8, 7).at(11, 0, 1, 0)), 14);

        assert_eq!(slots_for_date(&catalog, date(2026, 8, 7), &at_cutoff)?.len(), 2);
        assert_eq!(slots_for_date(&catalog, date(2026, 8, 7), &just_past)?.len(), 1);

        Ok(())
    }

    #[test]
    fn future_dates_offer_the_full_catalog_regardless_of_now() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(23, 59, 0, 0)), 14);
        let catalog = lunch_dinner_catalog();

        let slots = slots_for_date(&catalog, date(2026, 8, 8), &ctx)?;

        assert_eq!(slots.len(), 2);

        Ok(())
    }

    #[test]
    fn past_dates_offer_nothing() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(0, 0, 0, 0)), 14);
        let catalog = lunch_dinner_catalog();

        assert!(slots_for_date(&catalog, date(2026, 8, 6), &ctx)?.is_empty());

        Ok(())
    }

    #[test]
    fn empty_catalog_means_nothing_orderable() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(0, 0, 0, 0)), 14);
        let catalog = SlotCatalog::parse("");

        assert!(slots_for_horizon(&catalog, &ctx)?.is_empty());

        Ok(())
    }

    #[test]
    fn horizon_unions_days_in_ascending_order() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(12, 0, 0, 0)), 1);
        let catalog = lunch_dinner_catalog();

        let slots = slots_for_horizon(&catalog, &ctx)?;

        // Today's lunch cutoff has passed: dinner today plus both tomorrow.
        assert_eq!(slots.len(), 3);
        assert!(slots.windows(2).all(|pair| pair[0].timestamp() <= pair[1].timestamp()));

        Ok(())
    }

    #[test]
    fn candidate_within_tolerance_is_available() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(10, 0, 0, 0)), 14);
        let catalog = lunch_dinner_catalog();

        let drifted = utc(date(2026, 8, 7).at(13, 0, 59, 0));

        assert!(is_available(&catalog, &drifted, &ctx)?);

        Ok(())
    }

    #[test]
    fn candidate_past_tolerance_is_not_available() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(10, 0, 0, 0)), 14);
        let catalog = lunch_dinner_catalog();

        let drifted = utc(date(2026, 8, 7).at(13, 1, 1, 0));

        assert!(!is_available(&catalog, &drifted, &ctx)?);

        Ok(())
    }

    #[test]
    fn candidate_beyond_horizon_is_not_available() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(10, 0, 0, 0)), 2);
        let catalog = lunch_dinner_catalog();

        let beyond = utc(date(2026, 8, 10).at(13, 0, 0, 0));

        assert!(!is_available(&catalog, &beyond, &ctx)?);

        Ok(())
    }

    #[test]
    fn candidate_before_now_is_not_available() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(14, 0, 0, 0)), 14);
        let catalog = lunch_dinner_catalog();

        let earlier_today = utc(date(2026, 8, 7).at(13, 0, 0, 0));

        assert!(!is_available(&catalog, &earlier_today, &ctx)?);

        Ok(())
    }

    #[test]
    fn candidate_in_future_but_unlisted_is_not_available() -> TestResult {
        let ctx = scheduling_context(utc(date(2026, 8, 7).at(10, 0, 0, 0)), 14);
        let catalog = lunch_dinner_catalog();

        let unlisted = utc(date(2026, 8, 8).at(15, 30, 0, 0));

        assert!(!is_available(&catalog, &unlisted, &ctx)?);

        Ok(())
    }
}
