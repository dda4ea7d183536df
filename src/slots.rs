//! Delivery slot catalog.
//!
//! A store's delivery schedule is configured as a single setting value of
//! comma-separated `label-HH:mm-HH:mm` triples: the order cutoff first, then
//! the delivery time, both as 24-hour local times-of-day.

use jiff::civil::Time;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::warn;

/// One configured delivery slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDefinition {
    /// Display label, e.g. `Lunch`.
    pub label: String,
    /// Latest local time-of-day at which the slot may still be ordered for
    /// same-day delivery.
    pub cutoff: Time,
    /// Local time-of-day the delivery arrives.
    pub delivery: Time,
}

/// The store's configured slots, ordered ascending by delivery time-of-day.
///
/// An empty catalog means no slots are orderable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCatalog {
    slots: SmallVec<[SlotDefinition; 4]>,
}

impl SlotCatalog {
    /// Parses the store's delivery-schedule setting.
    ///
    /// Entries that do not split into exactly three dash-separated parts, or
    /// whose times fail to parse, are skipped with a warning; parsing never
    /// fails the whole catalog.
    pub fn parse(source: &str) -> Self {
        let mut slots: SmallVec<[SlotDefinition; 4]> = SmallVec::new();

        for entry in source.split(',') {
            let entry = entry.trim();

            if entry.is_empty() {
                continue;
            }

            let mut parts = entry.split('-');

            let (Some(label), Some(cutoff), Some(delivery), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                warn!(entry, "skipping malformed delivery slot entry");
                continue;
            };

            let (Ok(cutoff), Ok(delivery)) = (
                cutoff.trim().parse::<Time>(),
                delivery.trim().parse::<Time>(),
            ) else {
                warn!(entry, "skipping delivery slot entry with unparsable time");
                continue;
            };

            slots.push(SlotDefinition {
                label: label.trim().to_owned(),
                cutoff,
                delivery,
            });
        }

        slots.sort_by_key(|slot| slot.delivery);

        Self { slots }
    }

    /// The configured slots, ascending by delivery time-of-day.
    pub fn slots(&self) -> &[SlotDefinition] {
        &self.slots
    }

    /// Number of configured slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slots are configured.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates the configured slots.
    pub fn iter(&self) -> std::slice::Iter<'_, SlotDefinition> {
        self.slots.iter()
    }
}

impl<'a> IntoIterator for &'a SlotCatalog {
    type Item = &'a SlotDefinition;
    type IntoIter = std::slice::Iter<'a, SlotDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
