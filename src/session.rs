//! Session state and its durable persistence.
//!
//! A session is the bounded period between a start command and either a
//! stop command or report-budget exhaustion. Only the recipient and the
//! remaining-report budget survive a restart: the same-position streak
//! merely throttles duplicate suppression and is rebuilt at the
//! threshold, losing at most a few suppressed ticks.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};

/// Storage namespace holding every session key.
const NAMESPACE: &str = "session";
const KEY_RECIPIENT: &str = "recipient";
const KEY_REMAINING: &str = "remaining";

/// Read buffer sized for the longest value we persist (the recipient
/// address; E.164 tops out far below this).
const VALUE_BUF: usize = 64;

/// Mutable per-session state. Owned and written exclusively by the
/// session service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Destination address for outbound reports.
    pub recipient: String,
    /// Reports left before the session self-terminates.
    pub remaining_reports: u16,
    /// Stale ticks left before a duplicate report is forced anyway.
    pub same_position_streak: u8,
}

impl SessionState {
    pub fn new(recipient: String, remaining_reports: u16, same_position_streak: u8) -> Self {
        Self {
            recipient,
            remaining_reports,
            same_position_streak,
        }
    }

    /// Persist the recipient and the report budget (called once at session
    /// start). Storage failures are logged and swallowed: losing the
    /// checkpoint only costs resume fidelity, never the live session.
    pub fn persist(&self, store: &mut impl StoragePort) {
        if let Err(e) = store.write(NAMESPACE, KEY_RECIPIENT, self.recipient.as_bytes()) {
            warn!("failed to persist recipient: {e}");
        }
        self.checkpoint_remaining(store);
    }

    /// Checkpoint only the remaining-report counter.
    pub fn checkpoint_remaining(&self, store: &mut impl StoragePort) {
        match postcard::to_allocvec(&self.remaining_reports) {
            Ok(blob) => {
                if let Err(e) = store.write(NAMESPACE, KEY_REMAINING, &blob) {
                    warn!("failed to checkpoint remaining reports: {e}");
                }
            }
            Err(e) => warn!("failed to encode remaining reports: {e}"),
        }
    }

    /// Recover a session from the store, if one was persisted.
    ///
    /// The recipient is required; a missing or corrupt remaining-report
    /// value falls back to `fallback_remaining` (a restart loses at most
    /// one checkpoint interval of progress). The streak always restarts
    /// at the threshold.
    pub fn restore(
        store: &impl StoragePort,
        fallback_remaining: u16,
        same_position_streak: u8,
    ) -> Option<Self> {
        let mut buf = [0u8; VALUE_BUF];

        let recipient = match store.read(NAMESPACE, KEY_RECIPIENT, &mut buf) {
            Ok(n) => core::str::from_utf8(&buf[..n]).ok()?.to_owned(),
            Err(StorageError::NotFound) => return None,
            Err(e) => {
                warn!("failed to read persisted recipient: {e}");
                return None;
            }
        };

        let remaining = match store.read(NAMESPACE, KEY_REMAINING, &mut buf) {
            Ok(n) => postcard::from_bytes(&buf[..n]).unwrap_or(fallback_remaining),
            Err(_) => fallback_remaining,
        };

        Some(Self::new(recipient, remaining, same_position_streak))
    }

    /// Remove every persisted session key. Idempotent.
    pub fn clear_persisted(store: &mut impl StoragePort) {
        for key in [KEY_RECIPIENT, KEY_REMAINING] {
            if let Err(e) = store.delete(NAMESPACE, key) {
                warn!("failed to clear persisted {key}: {e}");
            }
        }
    }

    /// Whether any session key survives in the store.
    pub fn is_persisted(store: &impl StoragePort) -> bool {
        store.exists(NAMESPACE, KEY_RECIPIENT)
    }
}
