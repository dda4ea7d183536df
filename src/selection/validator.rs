//! Selection validation.
//!
//! Pull-based: the stored choice is re-checked against live availability on
//! every relevant request, and stale choices are cleared as a side effect so
//! the customer is prompted to pick again.

use jiff::Zoned;
use thiserror::Error;
use tracing::warn;

use crate::{
    context::SchedulingContext,
    schedule::{self, ScheduleError},
    selection::store::{SelectionStore, SelectionStoreError},
    slots::SlotCatalog,
};

/// Paths on which the delivery-time prompt is suppressed.
const PROMPT_SUPPRESSED_PREFIXES: [&str; 3] = ["/admin", "/login", "/register"];

/// Outcome of checking the stored delivery selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionStatus {
    /// Nothing is stored.
    NoSelection,
    /// The stored selection is still orderable.
    Valid(Zoned),
    /// The stored selection lies in the past. It has been cleared.
    Expired,
    /// The stored selection is still in the future but no longer matches any
    /// offered slot (the schedule changed or the horizon shrank). It has been
    /// cleared.
    Invalid,
}

impl SelectionStatus {
    /// The prompt to show the customer, or `None` when the selection stands.
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            Self::Valid(_) => None,
            Self::NoSelection => Some("Please choose a delivery time."),
            Self::Expired => {
                Some("Your chosen delivery time has passed. Please choose a new delivery time.")
            }
            Self::Invalid => Some(
                "Your chosen delivery time is no longer available. Please choose a new delivery time.",
            ),
        }
    }

    /// Whether the customer must pick a delivery time.
    pub fn needs_prompt(&self) -> bool {
        !matches!(self, Self::Valid(_))
    }
}

#[derive(Debug, Error)]
enum ValidationError {
    #[error(transparent)]
    Store(#[from] SelectionStoreError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Checks a customer's stored slot selection against live availability and
/// decides whether to keep it, clear it, or prompt for a new choice.
#[derive(Debug)]
pub struct SelectionValidator<S> {
    store: S,
}

impl<S: SelectionStore> SelectionValidator<S> {
    /// Wraps the store holding the customer's selection.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying selection store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates the stored selection against live availability.
    ///
    /// Any unexpected failure degrades to [`SelectionStatus::NoSelection`]:
    /// an error must never cause a stale or unverifiable selection to be
    /// silently honored.
    pub fn validate(&self, catalog: &SlotCatalog, ctx: &SchedulingContext) -> SelectionStatus {
        match self.try_validate(catalog, ctx) {
            Ok(status) => status,
            Err(error) => {
                warn!(%error, "selection validation failed, treating as no selection");

                SelectionStatus::NoSelection
            }
        }
    }

    /// Like [`validate`](Self::validate), but suppressed entirely on
    /// administrative, login and registration paths.
    pub fn validate_for_path(
        &self,
        path: &str,
        catalog: &SlotCatalog,
        ctx: &SchedulingContext,
    ) -> Option<SelectionStatus> {
        should_prompt_for_path(path).then(|| self.validate(catalog, ctx))
    }

    fn try_validate(
        &self,
        catalog: &SlotCatalog,
        ctx: &SchedulingContext,
    ) -> Result<SelectionStatus, ValidationError> {
        let Some(selection) = self.store.get()? else {
            return Ok(SelectionStatus::NoSelection);
        };

        let selected = selection.to_zoned(ctx.time_zone().clone());

        if schedule::is_available(catalog, &selected, ctx)? {
            return Ok(SelectionStatus::Valid(selected));
        }

        self.store.clear()?;

        if selection < ctx.now.timestamp() {
            Ok(SelectionStatus::Expired)
        } else {
            Ok(SelectionStatus::Invalid)
        }
    }
}

/// Whether the delivery-time prompt applies to this request path at all.
pub fn should_prompt_for_path(path: &str) -> bool {
    let path = path.trim().to_ascii_lowercase();

    !PROMPT_SUPPRESSED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}
