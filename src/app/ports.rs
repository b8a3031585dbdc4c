//! Port traits — the hexagonal boundary between the session core and the
//! platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SessionService (domain)
//! ```
//!
//! Driven adapters (message transport, position providers, wall-clock
//! timers, durable storage) implement these traits. The
//! [`SessionService`](super::service::SessionService) consumes them as
//! method arguments, so the session core never touches a platform API
//! directly and runs unchanged under the host simulation and the test
//! mocks.
//!
//! All port errors are typed; the core degrades on every one of them
//! (logged no-op or skip) because no confirmation channel back to the
//! remote party exists.

use crate::location::{PositionSample, ProviderClass};

// ───────────────────────────────────────────────────────────────
// Outbound message port (domain → short-text transport)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget short-text sending. No delivery guarantee, no
/// acknowledgment: callers log a failure and proceed as if sent.
pub trait MessageSink {
    fn send(&mut self, recipient: &str, body: &str) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Position feed port (platform providers → domain)
// ───────────────────────────────────────────────────────────────

/// Parameters for a provider subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubscriptionRequest {
    /// Minimum interval between delivered updates (milliseconds).
    pub min_interval_ms: u32,
    /// Minimum displacement between delivered updates (meters).
    pub min_distance_m: f32,
}

/// Registration-style access to the platform's location providers.
///
/// Subscribing does not hand over a callback: the hosting event loop
/// delivers updates to `SessionService::handle_sample` itself, keeping
/// every handler on the one logical actor.
pub trait PositionFeed {
    /// Begin delivery of updates from one provider class.
    fn subscribe(&mut self, provider: ProviderClass, request: SubscriptionRequest);

    /// Stop delivery from one provider class. Idempotent.
    fn unsubscribe(&mut self, provider: ProviderClass);

    /// The provider's cached most-recent fix, if it has one.
    fn last_known(&self, provider: ProviderClass) -> Option<PositionSample>;
}

// ───────────────────────────────────────────────────────────────
// Report timer port (domain ↔ wall-clock scheduler)
// ───────────────────────────────────────────────────────────────

/// A repeating wall-clock wake-up. The platform may drift or coalesce
/// ticks; the core only assumes "roughly every `interval_ms`".
pub trait ReportTimer {
    fn schedule_repeating(&mut self, interval_ms: u32);

    /// Cancel the registered wake-up. Idempotent.
    fn cancel(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Durable storage port (domain ↔ key-value store)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage surviving process restarts.
///
/// Keys are namespaced to prevent collisions between subsystems. Writes
/// MUST be atomic — a power loss mid-write must not leave a torn value.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (log lines, a
/// telemetry uplink, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Injected wall-clock: the core never reads ambient time.
pub trait Clock {
    /// Current time as epoch milliseconds.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`MessageSink`] sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The transport accepted the message but could not dispatch it.
    SendFailed,
    /// No service: the radio is off or unregistered.
    NoService,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SendFailed => write!(f, "send failed"),
            Self::NoService => write!(f, "no service"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
