//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade. A telemetry uplink adapter would implement the same
//! trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::SessionStarted {
                recipient,
                remaining_reports,
            } => {
                info!("SESSION | started, recipient={recipient} remaining={remaining_reports}");
            }
            AppEvent::SessionEnded { reason } => {
                info!("SESSION | ended ({reason:?})");
            }
            AppEvent::SampleAccepted {
                provider,
                acceptance,
            } => {
                info!("SAMPLE  | {provider} accepted ({acceptance:?})");
            }
            AppEvent::SampleRejected { provider } => {
                info!("SAMPLE  | {provider} rejected");
            }
            AppEvent::ReportSent { kind, remaining } => {
                info!("REPORT  | sent {kind:?}, {remaining} remaining");
            }
            AppEvent::ReportSuppressed { streak_remaining } => {
                info!("REPORT  | suppressed, {streak_remaining} stale ticks until forced");
            }
            AppEvent::SendFailed { kind } => {
                info!("REPORT  | transport refused {kind:?} (ignored)");
            }
        }
    }
}
