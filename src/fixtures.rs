//! Fixtures
//!
//! In-memory collaborators and a canonical schedule shared by the unit and
//! integration tests.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use jiff::{
    Timestamp, Zoned,
    civil::{Date, DateTime},
    tz::TimeZone,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    CompanyUuid, CustomerUuid, OrderUuid, StoreUuid,
    allowance::{OrderHistory, OrderHistoryError, OrderRecord, OrderStatus, PaymentStatus},
    context::SchedulingContext,
    directory::{Company, Customer, Directory, DirectoryError, SchedulingProfile},
    slots::SlotCatalog,
};

/// The canonical two-slot schedule used across the test suite.
pub const LUNCH_DINNER_SCHEDULE: &str = "Lunch-11:00-13:00,Dinner-17:00-19:00";

/// Parses [`LUNCH_DINNER_SCHEDULE`].
pub fn lunch_dinner_catalog() -> SlotCatalog {
    SlotCatalog::parse(LUNCH_DINNER_SCHEDULE)
}

/// Projects a civil datetime into UTC.
pub fn utc(datetime: DateTime) -> Zoned {
    // UTC has no transitions, so the projection is total.
    datetime
        .to_zoned(TimeZone::UTC)
        .unwrap_or_else(|_| Zoned::new(Timestamp::UNIX_EPOCH, TimeZone::UTC))
}

/// A context for an unaffiliated customer frozen at `now`.
pub fn scheduling_context(now: Zoned, order_ahead_days: i16) -> SchedulingContext {
    SchedulingContext {
        customer: CustomerUuid::from(Uuid::now_v7()),
        company: None,
        now,
        order_ahead_days,
    }
}

/// A company with the given daily limit and no scheduling overrides.
pub fn company_with_limit(limit: i64) -> Company {
    Company {
        uuid: Uuid::now_v7().into(),
        profile: SchedulingProfile::default(),
        daily_limit: Decimal::from(limit),
    }
}

/// A member of the given company with no personal zone and no exemptions.
pub fn customer_of(company: &Company) -> Customer {
    Customer {
        uuid: Uuid::now_v7().into(),
        company: Some(company.uuid),
        time_zone: None,
        allowance_exempt: false,
    }
}

/// A confirmed, paid order scheduled for the given delivery time.
pub fn paid_order(total: i64, scheduled_for: &Zoned) -> OrderRecord {
    OrderRecord {
        uuid: Uuid::now_v7().into(),
        total: Decimal::from(total),
        scheduled_for: scheduled_for.clone(),
        status: OrderStatus::Confirmed,
        payment: PaymentStatus::Paid,
        deleted_at: None,
    }
}

/// A placed-but-unpaid order scheduled for the given delivery time.
pub fn pending_order(total: i64, scheduled_for: &Zoned) -> OrderRecord {
    OrderRecord {
        uuid: Uuid::now_v7().into(),
        total: Decimal::from(total),
        scheduled_for: scheduled_for.clone(),
        status: OrderStatus::Pending,
        payment: PaymentStatus::Unpaid,
        deleted_at: None,
    }
}

/// A cancelled order that had already been paid.
pub fn cancelled_order(total: i64, scheduled_for: &Zoned) -> OrderRecord {
    OrderRecord {
        uuid: Uuid::now_v7().into(),
        total: Decimal::from(total),
        scheduled_for: scheduled_for.clone(),
        status: OrderStatus::Cancelled,
        payment: PaymentStatus::Paid,
        deleted_at: None,
    }
}

/// Directory backed by plain vectors.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    customers: Vec<Customer>,
    companies: Vec<Company>,
    schedules: Vec<(StoreUuid, String)>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a customer record.
    #[must_use]
    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customers.push(customer);
        self
    }

    /// Adds a company record.
    #[must_use]
    pub fn with_company(mut self, company: Company) -> Self {
        self.companies.push(company);
        self
    }

    /// Sets a store's delivery-schedule setting.
    #[must_use]
    pub fn with_schedule(mut self, store: StoreUuid, schedule: &str) -> Self {
        self.schedules.push((store, schedule.to_owned()));
        self
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn customer(&self, uuid: CustomerUuid) -> Result<Customer, DirectoryError> {
        self.customers
            .iter()
            .find(|customer| customer.uuid == uuid)
            .cloned()
            .ok_or(DirectoryError::CustomerNotFound)
    }

    async fn company(&self, uuid: CompanyUuid) -> Result<Option<Company>, DirectoryError> {
        Ok(self
            .companies
            .iter()
            .find(|company| company.uuid == uuid)
            .cloned())
    }

    async fn delivery_schedule(&self, store: StoreUuid) -> Result<Option<String>, DirectoryError> {
        Ok(self
            .schedules
            .iter()
            .find(|(uuid, _)| *uuid == store)
            .map(|(_, schedule)| schedule.clone()))
    }
}

/// Order history backed by a mutex-guarded vector; `mark_paid` flips the
/// record's payment status so later reads observe the capture.
#[derive(Debug, Default)]
pub struct InMemoryOrderHistory {
    orders: Mutex<Vec<(CustomerUuid, StoreUuid, OrderRecord)>>,
}

impl InMemoryOrderHistory {
    /// Records an order for the customer in the store.
    pub fn push(&self, customer: CustomerUuid, store: StoreUuid, order: OrderRecord) {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((customer, store, order));
    }
}

#[async_trait]
impl OrderHistory for InMemoryOrderHistory {
    async fn orders_for_day(
        &self,
        customer: CustomerUuid,
        store: StoreUuid,
        date: Date,
    ) -> Result<Vec<OrderRecord>, OrderHistoryError> {
        Ok(self
            .orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(c, s, order)| {
                *c == customer && *s == store && order.scheduled_for.date() == date
            })
            .map(|(_, _, order)| order.clone())
            .collect())
    }

    async fn mark_paid(&self, order: OrderUuid) -> Result<(), OrderHistoryError> {
        let mut orders = self.orders.lock().unwrap_or_else(PoisonError::into_inner);

        let record = orders
            .iter_mut()
            .map(|(_, _, record)| record)
            .find(|record| record.uuid == order)
            .ok_or(OrderHistoryError::OrderNotFound)?;

        record.payment = PaymentStatus::Paid;

        Ok(())
    }
}
