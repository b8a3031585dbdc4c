//! Report scheduling state machine and outbound text composition.
//!
//! One tick arrives roughly every report interval. The scheduler decides
//! whether to send a fresh-position report, force a duplicate after the
//! same-position streak runs out, send a "no location" notice, or end the
//! session once the report budget is spent.
//!
//! The scheduler performs no I/O. Each tick returns a [`TickOutcome`]
//! that the session service dispatches through its ports — the same
//! decoupling the rest of the core uses, which keeps every branch of the
//! decision table directly testable.

use core::fmt::Write as _;

use heapless::String as FixedString;
use log::info;

use crate::location::{LocationArbiter, PositionSample};
use crate::session::SessionState;

/// Upper bound of a single short text (one GSM-7 segment).
pub const MAX_REPORT_LEN: usize = 160;

/// A composed outbound report body. Fixed capacity: composing can
/// truncate a pathological value but can never reallocate or panic.
pub type ReportText = FixedString<MAX_REPORT_LEN>;

/// Marker appended to the report that spends the last of the budget.
const LAST_MESSAGE_SUFFIX: &str = " (last message)";

// ───────────────────────────────────────────────────────────────
// Tick outcome
// ───────────────────────────────────────────────────────────────

/// What kind of report a tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// A fresh fix, not yet reported.
    Position,
    /// The held fix again, forced after a full stale streak.
    SamePosition,
    /// No fix has ever been accepted.
    NoLocation,
    /// The cached fix reported once at session start.
    LastKnown,
}

/// Scheduler lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Ended,
}

/// One composed report ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: ReportKind,
    pub text: ReportText,
}

/// The full result of one tick evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Report to dispatch, if any.
    pub report: Option<Report>,
    /// The budget ran out on this tick; tear the session down.
    pub terminated: bool,
    /// Post-decrement counter value due for a durable checkpoint.
    pub checkpoint: Option<u16>,
}

impl TickOutcome {
    /// Nothing to send, nothing to persist.
    fn quiet() -> Self {
        Self {
            report: None,
            terminated: false,
            checkpoint: None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduler
// ───────────────────────────────────────────────────────────────

/// Per-tick decision engine for one session.
pub struct ReportScheduler {
    phase: Phase,
    streak_threshold: u8,
    checkpoint_every: u16,
}

impl ReportScheduler {
    pub fn new(streak_threshold: u8, checkpoint_every: u16) -> Self {
        Self {
            phase: Phase::Active,
            streak_threshold,
            checkpoint_every,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Evaluate one timer tick.
    ///
    /// Decision table, in order:
    /// 1. fresh fix held        → position report
    /// 2. stale fix held        → burn one streak step; at zero, forced
    ///    duplicate ("same …"); otherwise silence
    /// 3. no fix ever accepted  → "no location"
    pub fn on_tick(
        &mut self,
        arbiter: &mut LocationArbiter,
        session: &mut SessionState,
    ) -> TickOutcome {
        if self.phase == Phase::Ended {
            return TickOutcome::quiet();
        }

        let fresh = arbiter.take_fresh();
        let report = if let Some(best) = arbiter.best().copied() {
            if fresh {
                Some(compose_position(&best, ReportKind::Position))
            } else {
                session.same_position_streak = session.same_position_streak.saturating_sub(1);
                if session.same_position_streak == 0 {
                    Some(compose_position(&best, ReportKind::SamePosition))
                } else {
                    info!(
                        "no new location; {} stale ticks until a forced report",
                        session.same_position_streak
                    );
                    None
                }
            }
        } else {
            let mut text = ReportText::new();
            let _ = text.push_str("no location");
            Some(Report {
                kind: ReportKind::NoLocation,
                text,
            })
        };

        match report {
            Some(report) => self.finish_send(report, session),
            None => TickOutcome::quiet(),
        }
    }

    /// Compose the session-start "last known fix" report and run it
    /// through the same send bookkeeping as a tick report.
    pub fn seed_report(
        &mut self,
        best: &PositionSample,
        now_ms: u64,
        session: &mut SessionState,
    ) -> TickOutcome {
        let mut text = ReportText::new();
        let _ = write!(
            text,
            "http://maps.google.com/maps?q={},{} Accuracy:{} Time:{}",
            best.lat,
            best.lon,
            best.accuracy_m.unwrap_or(0.0),
            format_age(now_ms, best.observed_at_ms),
        );
        self.finish_send(
            Report {
                kind: ReportKind::LastKnown,
                text,
            },
            session,
        )
    }

    /// Bookkeeping shared by every sent report: streak reset, budget
    /// decrement, checkpoint policy, termination marker.
    fn finish_send(&mut self, mut report: Report, session: &mut SessionState) -> TickOutcome {
        session.same_position_streak = self.streak_threshold;
        session.remaining_reports = session.remaining_reports.saturating_sub(1);
        let remaining = session.remaining_reports;

        let terminated = remaining == 0;
        if terminated {
            info!("report budget spent; ending session");
            let _ = report.text.push_str(LAST_MESSAGE_SUFFIX);
            self.phase = Phase::Ended;
        }

        let checkpoint = (self.checkpoint_every > 0 && remaining % self.checkpoint_every == 0)
            .then_some(remaining);

        TickOutcome {
            report: Some(report),
            terminated,
            checkpoint,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Text composition
// ───────────────────────────────────────────────────────────────

fn compose_position(best: &PositionSample, kind: ReportKind) -> Report {
    let mut text = ReportText::new();
    if kind == ReportKind::SamePosition {
        let _ = text.push_str("same ");
    }
    // Unknown accuracy renders as 0.
    let _ = write!(
        text,
        "http://maps.google.com/maps?q={},{} Accuracy:{}m",
        best.lat,
        best.lon,
        best.accuracy_m.unwrap_or(0.0),
    );
    Report { kind, text }
}

/// Coarse relative age of a fix, for the session-start report.
fn format_age(now_ms: u64, observed_at_ms: u64) -> FixedString<24> {
    let secs = now_ms.saturating_sub(observed_at_ms) / 1000;
    let mut out = FixedString::new();
    let _ = if secs < 60 {
        write!(out, "{secs} sec ago")
    } else if secs < 3600 {
        write!(out, "{} min ago", secs / 60)
    } else if secs < 86_400 {
        write!(out, "{} hr ago", secs / 3600)
    } else {
        write!(out, "{} days ago", secs / 86_400)
    };
    out
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
