//! Selection storage.
//!
//! The chosen delivery time is held redundantly: a short-lived primary store
//! (session-scoped) consulted first, and a longer-lived encoded fallback
//! (~1 day) consulted only on a primary miss. Storage is single-user,
//! request-scoped state; last-writer-wins needs no cross-request
//! synchronization.

use std::sync::{Mutex, PoisonError};

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long the fallback provider keeps a selection alive.
pub const DEFAULT_FALLBACK_TTL: SignedDuration = SignedDuration::from_hours(24);

/// Errors raised by a selection store provider.
#[derive(Debug, Error)]
pub enum SelectionStoreError {
    /// The backing provider failed.
    #[error("selection store backend error: {0}")]
    Backend(String),

    /// The fallback payload could not be encoded or decoded.
    #[error("selection payload error")]
    Payload(#[from] serde_json::Error),

    /// Computing the fallback expiry left the representable range.
    #[error("selection expiry out of range")]
    ExpiryOutOfRange(#[source] jiff::Error),
}

/// Request-scoped storage for the customer's chosen delivery time.
pub trait SelectionStore: Send + Sync {
    /// The stored selection, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionStoreError`] when the backing provider fails.
    fn get(&self) -> Result<Option<Timestamp>, SelectionStoreError>;

    /// Stores a selection, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionStoreError`] when the backing provider fails.
    fn set(&self, selection: Timestamp) -> Result<(), SelectionStoreError>;

    /// Removes the stored selection.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionStoreError`] when the backing provider fails.
    fn clear(&self) -> Result<(), SelectionStoreError>;
}

/// The session-scoped primary provider: a plain in-memory slot.
#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    selection: Mutex<Option<Timestamp>>,
}

impl MemorySelectionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStore for MemorySelectionStore {
    fn get(&self) -> Result<Option<Timestamp>, SelectionStoreError> {
        Ok(*self.selection.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn set(&self, selection: Timestamp) -> Result<(), SelectionStoreError> {
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner) = Some(selection);

        Ok(())
    }

    fn clear(&self) -> Result<(), SelectionStoreError> {
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner) = None;

        Ok(())
    }
}

/// The wire form of the fallback payload.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSelection {
    selection: Timestamp,
    expires_at: Timestamp,
}

/// The client-side fallback provider: an encoded payload with its own expiry.
///
/// The payload carries its expiry so a revived value older than the TTL reads
/// as a miss. This is the one component of the crate that reads the wall
/// clock; its whole job is wall-clock expiry.
#[derive(Debug)]
pub struct ExpiringSelectionStore {
    payload: Mutex<Option<String>>,
    ttl: SignedDuration,
}

impl Default for ExpiringSelectionStore {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_TTL)
    }
}

impl ExpiringSelectionStore {
    /// Creates an empty store whose entries live for `ttl`.
    pub fn new(ttl: SignedDuration) -> Self {
        Self {
            payload: Mutex::new(None),
            ttl,
        }
    }

    /// The encoded payload as persisted, if any. What the transport layer
    /// would write out to the client.
    pub fn encoded(&self) -> Option<String> {
        self.payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Seeds the store from a previously persisted payload.
    pub fn revive(&self, payload: String) {
        *self.payload.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload);
    }
}

impl SelectionStore for ExpiringSelectionStore {
    fn get(&self) -> Result<Option<Timestamp>, SelectionStoreError> {
        let payload = self.encoded();

        let Some(payload) = payload else {
            return Ok(None);
        };

        let stored: StoredSelection = serde_json::from_str(&payload)?;

        if stored.expires_at < Timestamp::now() {
            self.clear()?;

            return Ok(None);
        }

        Ok(Some(stored.selection))
    }

    fn set(&self, selection: Timestamp) -> Result<(), SelectionStoreError> {
        let expires_at = Timestamp::now()
            .checked_add(self.ttl)
            .map_err(SelectionStoreError::ExpiryOutOfRange)?;

        let encoded = serde_json::to_string(&StoredSelection {
            selection,
            expires_at,
        })?;

        *self.payload.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);

        Ok(())
    }

    fn clear(&self) -> Result<(), SelectionStoreError> {
        *self.payload.lock().unwrap_or_else(PoisonError::into_inner) = None;

        Ok(())
    }
}

/// Two prioritised providers: the primary is always consulted first, the
/// fallback only on a primary miss. Writes and clears go through to both.
#[derive(Debug)]
pub struct DualSelectionStore<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> DualSelectionStore<P, F> {
    /// Pairs a primary provider with its fallback.
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// The primary provider.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The fallback provider.
    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P: SelectionStore, F: SelectionStore> SelectionStore for DualSelectionStore<P, F> {
    fn get(&self) -> Result<Option<Timestamp>, SelectionStoreError> {
        if let Some(selection) = self.primary.get()? {
            return Ok(Some(selection));
        }

        self.fallback.get()
    }

    fn set(&self, selection: Timestamp) -> Result<(), SelectionStoreError> {
        self.primary.set(selection)?;
        self.fallback.set(selection)
    }

    fn clear(&self) -> Result<(), SelectionStoreError> {
        self.primary.clear()?;
        self.fallback.clear()
    }
}
