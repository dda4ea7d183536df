//! Allowance ledger.
//!
//! There is no persisted running balance: spend is recomputed from order
//! history on every query, so the capture path must serialize per
//! `(company, day)` or two concurrent checkouts could both observe the same
//! spend and jointly overspend the cap.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::civil::Date;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    CompanyUuid, StoreUuid,
    allowance::{
        history::{OrderHistory, OrderHistoryError},
        models::{AllowanceState, CaptureDecision, OrderRecord, OrderStatus, PaymentStatus},
    },
    directory::{Company, Customer},
};

/// Errors raised by ledger queries. A failure here is fatal to the payment
/// attempt being authorized; the order stays unpaid.
#[derive(Debug, Error)]
pub enum AllowanceError {
    /// The order history could not be read or updated.
    #[error(transparent)]
    History(#[from] OrderHistoryError),
}

/// A customer's spend against the company allowance on `date`.
///
/// Counts orders scheduled for that day that are not cancelled, are paid,
/// and are not soft-deleted. Every consumer of the daily-spend rule calls
/// this one function.
pub fn daily_spend(orders: &[OrderRecord], date: Date) -> Decimal {
    orders
        .iter()
        .filter(|order| order.scheduled_for.date() == date)
        .filter(|order| order.status != OrderStatus::Cancelled)
        .filter(|order| order.payment == PaymentStatus::Paid)
        .filter(|order| order.deleted_at.is_none())
        .map(|order| order.total)
        .sum()
}

/// The daily cap that applies to this customer.
///
/// Zero for an allowance-exempt customer or one with no company affiliation;
/// otherwise the company's configured limit.
pub fn company_limit(customer: &Customer, company: Option<&Company>) -> Decimal {
    if customer.allowance_exempt {
        return Decimal::ZERO;
    }

    company.map_or(Decimal::ZERO, |company| company.daily_limit)
}

/// Budget left for the day, clamped at zero.
pub fn remaining_allowance(limit: Decimal, spent: Decimal) -> Decimal {
    if spent >= limit {
        Decimal::ZERO
    } else {
        limit - spent
    }
}

/// The shared ledger consumed by every payment surface: pre-checkout
/// visibility and capture-time authorization.
pub struct AllowanceLedger {
    history: Arc<dyn OrderHistory>,
    capture_locks: Mutex<FxHashMap<(CompanyUuid, Date), Arc<Mutex<()>>>>,
}

impl Debug for AllowanceLedger {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AllowanceLedger").finish_non_exhaustive()
    }
}

impl AllowanceLedger {
    /// Creates a ledger over the given order history.
    pub fn new(history: Arc<dyn OrderHistory>) -> Self {
        Self {
            history,
            capture_locks: Mutex::new(FxHashMap::default()),
        }
    }

    /// The derived `{limit, spent, remaining}` view for one day.
    ///
    /// # Errors
    ///
    /// Returns an [`AllowanceError`] when the order history cannot be read.
    pub async fn state(
        &self,
        customer: &Customer,
        company: Option<&Company>,
        store: StoreUuid,
        date: Date,
    ) -> Result<AllowanceState, AllowanceError> {
        let orders = self.history.orders_for_day(customer.uuid, store, date).await?;

        let spent = daily_spend(&orders, date);
        let limit = company_limit(customer, company);

        Ok(AllowanceState {
            limit,
            spent,
            remaining: remaining_allowance(limit, spent),
        })
    }

    /// Whether the company-allowance payment option should be offered for the
    /// live cart at all.
    ///
    /// Advisory: compares existing spend plus the current cart total against
    /// the cap so customers do not reach checkout only to be rejected. A cart
    /// that fails its shippability precondition never sees the option.
    ///
    /// # Errors
    ///
    /// Returns an [`AllowanceError`] when the order history cannot be read.
    pub async fn offers_payment(
        &self,
        customer: &Customer,
        company: Option<&Company>,
        store: StoreUuid,
        date: Date,
        cart_total: Decimal,
        shippable: bool,
    ) -> Result<bool, AllowanceError> {
        if !shippable {
            return Ok(false);
        }

        let state = self.state(customer, company, store, date).await?;

        Ok(state.spent + cart_total <= state.limit)
    }

    /// Authorizes an order against the remaining allowance and, on approval,
    /// marks it paid.
    ///
    /// `(company, scheduled day)` is a serialization key: captures for the
    /// same key run one at a time, so the second of two concurrent checkouts
    /// observes the first one's spend.
    ///
    /// # Errors
    ///
    /// Returns an [`AllowanceError`] when the order history cannot be read or
    /// updated; the order is not marked paid in that case.
    #[tracing::instrument(
        name = "allowance.capture",
        skip(self, customer, company, order),
        fields(
            customer_uuid = %customer.uuid,
            order_uuid = %order.uuid,
            order_total = %order.total
        ),
        err
    )]
    pub async fn capture(
        &self,
        customer: &Customer,
        company: Option<&Company>,
        store: StoreUuid,
        order: &OrderRecord,
    ) -> Result<CaptureDecision, AllowanceError> {
        let date = order.scheduled_for.date();

        let key_lock = match customer.company {
            Some(company_uuid) => Some(self.capture_lock(company_uuid, date).await),
            None => None,
        };

        let _guard = match key_lock.as_ref() {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let state = self.state(customer, company, store, date).await?;

        if state.remaining >= order.total {
            self.history.mark_paid(order.uuid).await?;

            let remaining = state.remaining - order.total;

            info!(%remaining, "captured order against company allowance");

            Ok(CaptureDecision::Approved { remaining })
        } else {
            let shortfall = order.total - state.remaining;

            info!(%shortfall, "rejected order over company allowance");

            Ok(CaptureDecision::Rejected {
                attempted: order.total,
                remaining: state.remaining,
                shortfall,
            })
        }
    }

    async fn capture_lock(&self, company: CompanyUuid, date: Date) -> Arc<Mutex<()>> {
        let mut locks = self.capture_locks.lock().await;

        locks.entry((company, date)).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        StoreUuid,
        allowance::history::MockOrderHistory,
        fixtures::{
            InMemoryOrderHistory, cancelled_order, company_with_limit, customer_of, paid_order,
            pending_order, utc,
        },
    };

    use super::*;

    fn store() -> StoreUuid {
        StoreUuid::from(Uuid::now_v7())
    }

    #[test]
    fn daily_spend_counts_only_paid_live_orders_for_the_day() {
        let day = utc(date(2026, 8, 7).at(13, 0, 0, 0));
        let other_day = utc(date(2026, 8, 8).at(13, 0, 0, 0));

        let mut deleted = paid_order(400, &day);
        deleted.deleted_at = Some(day.timestamp());

        let orders = [
            paid_order(3000, &day),
            pending_order(500, &day),
            cancelled_order(700, &day),
            deleted,
            paid_order(900, &other_day),
        ];

        assert_eq!(daily_spend(&orders, date(2026, 8, 7)), Decimal::from(3000));
    }

    #[test]
    fn limit_is_zero_for_exempt_customers_and_the_companyless() {
        let company = company_with_limit(5000);

        let member = customer_of(&company);
        let mut exempt = customer_of(&company);
        exempt.allowance_exempt = true;

        let mut unaffiliated = customer_of(&company);
        unaffiliated.company = None;

        assert_eq!(company_limit(&member, Some(&company)), Decimal::from(5000));
        assert_eq!(company_limit(&exempt, Some(&company)), Decimal::ZERO);
        assert_eq!(company_limit(&unaffiliated, None), Decimal::ZERO);
    }

    #[test]
    fn remaining_allowance_clamps_at_zero() {
        let limit = Decimal::from(5000);

        assert_eq!(
            remaining_allowance(limit, Decimal::from(3000)),
            Decimal::from(2000)
        );
        assert_eq!(remaining_allowance(limit, Decimal::from(5000)), Decimal::ZERO);
        assert_eq!(remaining_allowance(limit, Decimal::from(9000)), Decimal::ZERO);
    }

    #[tokio::test]
    async fn capture_within_budget_approves_and_marks_paid() -> TestResult {
        let company = company_with_limit(5000);
        let customer = customer_of(&company);
        let store = store();
        let day = utc(date(2026, 8, 7).at(13, 0, 0, 0));

        let history = Arc::new(InMemoryOrderHistory::default());
        history.push(customer.uuid, store, paid_order(3000, &day));

        let order = pending_order(2000, &day);
        history.push(customer.uuid, store, order.clone());

        let ledger = AllowanceLedger::new(history.clone());

        let decision = ledger
            .capture(&customer, Some(&company), store, &order)
            .await?;

        assert_eq!(
            decision,
            CaptureDecision::Approved {
                remaining: Decimal::ZERO
            }
        );

        let state = ledger
            .state(&customer, Some(&company), store, day.date())
            .await?;

        assert_eq!(state.spent, Decimal::from(5000));
        assert_eq!(state.remaining, Decimal::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn capture_over_budget_rejects_with_the_shortfall() -> TestResult {
        let company = company_with_limit(5000);
        let customer = customer_of(&company);
        let store = store();
        let day = utc(date(2026, 8, 7).at(13, 0, 0, 0));

        let history = Arc::new(InMemoryOrderHistory::default());
        history.push(customer.uuid, store, paid_order(3000, &day));

        let order = pending_order(2001, &day);
        history.push(customer.uuid, store, order.clone());

        let ledger = AllowanceLedger::new(history.clone());

        let decision = ledger
            .capture(&customer, Some(&company), store, &order)
            .await?;

        assert_eq!(
            decision,
            CaptureDecision::Rejected {
                attempted: Decimal::from(2001),
                remaining: Decimal::from(2000),
                shortfall: Decimal::ONE,
            }
        );

        // Rejection must not mark the order paid.
        let state = ledger
            .state(&customer, Some(&company), store, day.date())
            .await?;

        assert_eq!(state.spent, Decimal::from(3000));

        Ok(())
    }

    #[tokio::test]
    async fn history_failure_is_fatal_to_the_capture() {
        let company = company_with_limit(5000);
        let customer = customer_of(&company);
        let day = utc(date(2026, 8, 7).at(13, 0, 0, 0));

        let mut history = MockOrderHistory::new();
        history
            .expect_orders_for_day()
            .returning(|_, _, _| Err(OrderHistoryError::Backend("down".to_owned())));

        let ledger = AllowanceLedger::new(Arc::new(history));

        let result = ledger
            .capture(&customer, Some(&company), store(), &pending_order(100, &day))
            .await;

        assert!(
            matches!(result, Err(AllowanceError::History(_))),
            "expected history error, got {result:?}"
        );
    }

    #[tokio::test]
    async fn visibility_hides_the_option_when_the_cart_would_overspend() -> TestResult {
        let company = company_with_limit(5000);
        let customer = customer_of(&company);
        let store = store();
        let day = utc(date(2026, 8, 7).at(13, 0, 0, 0));

        let history = Arc::new(InMemoryOrderHistory::default());
        history.push(customer.uuid, store, paid_order(3000, &day));

        let ledger = AllowanceLedger::new(history);

        let fits = ledger
            .offers_payment(
                &customer,
                Some(&company),
                store,
                day.date(),
                Decimal::from(2000),
                true,
            )
            .await?;

        let overspends = ledger
            .offers_payment(
                &customer,
                Some(&company),
                store,
                day.date(),
                Decimal::from(2001),
                true,
            )
            .await?;

        let unshippable = ledger
            .offers_payment(
                &customer,
                Some(&company),
                store,
                day.date(),
                Decimal::ONE,
                false,
            )
            .await?;

        assert!(fits);
        assert!(!overspends);
        assert!(!unshippable);

        Ok(())
    }
}
