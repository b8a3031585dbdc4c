//! Outbound application events.
//!
//! The [`SessionService`](super::service::SessionService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — structured log lines, a
//! telemetry uplink, a test recorder.

use crate::location::{Acceptance, ProviderClass};
use crate::report::ReportKind;

/// Structured events emitted by the session core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A session began (fresh start or post-restart resume).
    SessionStarted {
        recipient: String,
        remaining_reports: u16,
    },

    /// The session was torn down.
    SessionEnded { reason: EndReason },

    /// A sample superseded the held best fix.
    SampleAccepted {
        provider: ProviderClass,
        acceptance: Acceptance,
    },

    /// A sample was dropped by the arbitration rules.
    SampleRejected { provider: ProviderClass },

    /// A report went out (or was handed to the transport, at least).
    ReportSent { kind: ReportKind, remaining: u16 },

    /// A stale tick passed without a forced duplicate report.
    ReportSuppressed { streak_remaining: u8 },

    /// The outbound transport refused the report. State still advanced.
    SendFailed { kind: ReportKind },
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// A stop command arrived.
    StopCommand,
    /// The report budget ran out.
    ReportsExhausted,
    /// A new start command replaced the running session.
    Replaced,
}
