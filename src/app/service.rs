//! Session service — the hexagonal core.
//!
//! [`SessionService`] owns the location arbiter, the report scheduler,
//! and the session state, and is the only writer of any of them. All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  inbound text ──▶ ┌──────────────────────────┐ ──▶ MessageSink
//!  samples      ──▶ │      SessionService       │ ──▶ EventSink
//!  timer ticks  ──▶ │ interpreter · arbiter ·   │ ──▶ StoragePort
//!  boot signal  ──▶ │ scheduler · session state │
//!                   └──────────────────────────┘
//!                   PositionFeed / ReportTimer / Clock
//! ```
//!
//! Every entry point takes `&mut self` and is invoked from one hosting
//! event loop, so command, sample, and tick handling are serialized by
//! construction. Nothing here blocks: sends are fire-and-forget and
//! every failure degrades to a logged no-op.

use log::{info, warn};

use crate::app::commands::{self, Command};
use crate::app::events::{AppEvent, EndReason};
use crate::app::ports::{
    Clock, EventSink, MessageSink, PositionFeed, ReportTimer, StoragePort, SubscriptionRequest,
};
use crate::config::LocatorConfig;
use crate::location::{LocationArbiter, PositionSample, ProviderClass};
use crate::report::{ReportScheduler, TickOutcome};
use crate::session::SessionState;

/// What the inbound adapter should do with the message it just delivered.
///
/// `Consumed` maps to the platform's "abort further delivery" signal, so
/// trigger texts never reach other consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDisposition {
    Consumed,
    Passthrough,
}

// ───────────────────────────────────────────────────────────────
// SessionService
// ───────────────────────────────────────────────────────────────

/// Orchestrates one locator session end to end.
pub struct SessionService {
    config: LocatorConfig,
    arbiter: LocationArbiter,
    scheduler: ReportScheduler,
    session: Option<SessionState>,
}

impl SessionService {
    /// Construct an idle service. No session runs until a trigger text
    /// arrives or [`resume`](Self::resume) finds persisted state.
    pub fn new(config: LocatorConfig) -> Self {
        let scheduler =
            ReportScheduler::new(config.same_position_streak, config.counter_checkpoint_every);
        Self {
            config,
            arbiter: LocationArbiter::new(),
            scheduler,
            session: None,
        }
    }

    // ── Inbound messages ──────────────────────────────────────

    /// Interpret one inbound text and act on it.
    pub fn handle_message(
        &mut self,
        body: &str,
        origin: &str,
        feed: &mut impl PositionFeed,
        timer: &mut impl ReportTimer,
        outbox: &mut impl MessageSink,
        store: &mut impl StoragePort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> MessageDisposition {
        let command = commands::interpret(
            body,
            origin,
            &self.config.trigger_phrase,
            &self.config.stop_phrase,
        );
        match command {
            Command::Start { recipient } => {
                // A running session is fully torn down first so provider
                // feeds can never end up double-registered.
                if self.session.is_some() {
                    self.end_session(EndReason::Replaced, feed, timer, store, sink);
                }
                // Persist first: a start interrupted by a crash still
                // leaves a resumable record behind.
                SessionState::new(
                    recipient,
                    self.config.max_reports,
                    self.config.same_position_streak,
                )
                .persist(store);
                self.start_from_store(feed, timer, outbox, store, clock, sink);
                MessageDisposition::Consumed
            }
            Command::Stop => {
                self.stop(feed, timer, store, sink);
                MessageDisposition::Consumed
            }
            Command::Ignore => MessageDisposition::Passthrough,
        }
    }

    // ── Samples ───────────────────────────────────────────────

    /// Feed one provider sample into arbitration.
    pub fn handle_sample(&mut self, sample: PositionSample, sink: &mut impl EventSink) {
        if self.session.is_none() {
            // Stale delivery queued before an unsubscribe landed.
            return;
        }
        let acceptance = self.arbiter.consider(sample);
        if acceptance.accepted() {
            sink.emit(&AppEvent::SampleAccepted {
                provider: sample.provider,
                acceptance,
            });
        } else {
            sink.emit(&AppEvent::SampleRejected {
                provider: sample.provider,
            });
        }
    }

    // ── Ticks ─────────────────────────────────────────────────

    /// One report-timer tick.
    pub fn handle_tick(
        &mut self,
        feed: &mut impl PositionFeed,
        timer: &mut impl ReportTimer,
        outbox: &mut impl MessageSink,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        let Some(session) = self.session.as_mut() else {
            // Stale tick queued before the timer cancel landed.
            return;
        };
        let outcome = self.scheduler.on_tick(&mut self.arbiter, session);
        if outcome.report.is_none() && self.arbiter.best().is_some() {
            sink.emit(&AppEvent::ReportSuppressed {
                streak_remaining: session.same_position_streak,
            });
        }
        self.dispatch_outcome(outcome, feed, timer, outbox, store, sink);
    }

    // ── Restart ───────────────────────────────────────────────

    /// Boot signal: resume a session whose state survived a restart.
    /// Nothing persisted means nothing to do.
    pub fn resume(
        &mut self,
        feed: &mut impl PositionFeed,
        timer: &mut impl ReportTimer,
        outbox: &mut impl MessageSink,
        store: &mut impl StoragePort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        self.start_from_store(feed, timer, outbox, store, clock, sink);
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// End any running session and clear its persisted record.
    pub fn stop(
        &mut self,
        feed: &mut impl PositionFeed,
        timer: &mut impl ReportTimer,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        if self.session.is_some() {
            self.end_session(EndReason::StopCommand, feed, timer, store, sink);
        } else {
            // A stop can arrive for a session that never got to resume;
            // make sure no stale record survives.
            SessionState::clear_persisted(store);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether a session is currently running.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The running session's state, if any.
    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    /// The held best fix, if any.
    pub fn best(&self) -> Option<&PositionSample> {
        self.arbiter.best()
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Start (or resume) a session from whatever the store holds.
    fn start_from_store(
        &mut self,
        feed: &mut impl PositionFeed,
        timer: &mut impl ReportTimer,
        outbox: &mut impl MessageSink,
        store: &mut impl StoragePort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        let Some(state) = SessionState::restore(
            store,
            self.config.max_reports,
            self.config.same_position_streak,
        ) else {
            info!("start requested with no configured recipient; ignoring");
            return;
        };
        info!(
            "starting session: recipient={} remaining={}",
            state.recipient, state.remaining_reports
        );

        // Seed from the two highest-trust cached fixes. Network's cached
        // fix is deliberately not consulted; only its live updates are.
        self.arbiter = LocationArbiter::new();
        self.arbiter.seed(
            feed.last_known(ProviderClass::Gps),
            feed.last_known(ProviderClass::Passive),
        );

        // Register live updates from every provider class.
        let request = SubscriptionRequest {
            min_interval_ms: self.config.feed_min_interval_ms,
            min_distance_m: self.config.feed_min_distance_m,
        };
        for provider in ProviderClass::ALL {
            feed.subscribe(provider, request);
        }

        timer.schedule_repeating(self.config.report_interval_ms);
        self.scheduler = ReportScheduler::new(
            self.config.same_position_streak,
            self.config.counter_checkpoint_every,
        );

        sink.emit(&AppEvent::SessionStarted {
            recipient: state.recipient.clone(),
            remaining_reports: state.remaining_reports,
        });
        self.session = Some(state);

        // One immediate "last known" report when seeding found a fix.
        // It runs through the normal send path, so it spends budget and
        // can even be the session's last message.
        if let Some(best) = self.arbiter.best().copied() {
            let now_ms = clock.now_ms();
            if let Some(session) = self.session.as_mut() {
                let outcome = self.scheduler.seed_report(&best, now_ms, session);
                self.dispatch_outcome(outcome, feed, timer, outbox, store, sink);
            }
        }
    }

    /// Apply one tick (or seed) outcome: dispatch the report, persist the
    /// checkpoint, tear down on termination.
    fn dispatch_outcome(
        &mut self,
        outcome: TickOutcome,
        feed: &mut impl PositionFeed,
        timer: &mut impl ReportTimer,
        outbox: &mut impl MessageSink,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        if let Some(session) = self.session.as_mut() {
            if let Some(report) = &outcome.report {
                match outbox.send(&session.recipient, report.text.as_str()) {
                    Ok(()) => sink.emit(&AppEvent::ReportSent {
                        kind: report.kind,
                        remaining: session.remaining_reports,
                    }),
                    Err(e) => {
                        // Fire-and-forget: state advances as if sent.
                        warn!("report send failed ({e}); continuing");
                        sink.emit(&AppEvent::SendFailed { kind: report.kind });
                    }
                }
            }
            if outcome.checkpoint.is_some() {
                session.checkpoint_remaining(store);
            }
        }
        if outcome.terminated {
            self.end_session(EndReason::ReportsExhausted, feed, timer, store, sink);
        }
    }

    fn end_session(
        &mut self,
        reason: EndReason,
        feed: &mut impl PositionFeed,
        timer: &mut impl ReportTimer,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        info!("session ended: {reason:?}");
        timer.cancel();
        for provider in ProviderClass::ALL {
            feed.unsubscribe(provider);
        }
        SessionState::clear_persisted(store);
        self.arbiter.clear();
        self.session = None;
        sink.emit(&AppEvent::SessionEnded { reason });
    }
}
