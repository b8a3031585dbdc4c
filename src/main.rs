//! Phonefinder — host simulation entry point.
//!
//! Wires script-driven adapters around the session core and replays a
//! complete locator session: trigger text in, provider fixes, report
//! ticks, stop text. Every event is dispatched from one loop, the same
//! serialization a device build gets from its platform event queue.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │  SimFeed        SimTimer       ConsoleOutbox               │
//! │  (PositionFeed) (ReportTimer)  (MessageSink)               │
//! │  MemoryStore    SimClock       LogEventSink                │
//! │                                                            │
//! │  ────────────── Port Trait Boundary ──────────────         │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │          SessionService (pure logic)             │      │
//! │  └──────────────────────────────────────────────────┘      │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, VecDeque};

use anyhow::Result;
use log::info;

use phonefinder::adapters::{LogEventSink, MemoryStore};
use phonefinder::app::ports::{
    Clock, MessageSink, PositionFeed, ReportTimer, SubscriptionRequest, TransportError,
};
use phonefinder::app::service::SessionService;
use phonefinder::config::LocatorConfig;
use phonefinder::location::{PositionSample, ProviderClass};

// ── Simulation adapters ───────────────────────────────────────

/// Outbound messages go to the console.
struct ConsoleOutbox {
    sent: u32,
}

impl MessageSink for ConsoleOutbox {
    fn send(&mut self, recipient: &str, body: &str) -> Result<(), TransportError> {
        self.sent += 1;
        info!("OUTBOX  | to {recipient}: \"{body}\"");
        Ok(())
    }
}

/// Provider registry with scripted cached fixes.
#[derive(Default)]
struct SimFeed {
    subscriptions: Vec<(ProviderClass, SubscriptionRequest)>,
    cached: HashMap<ProviderClass, PositionSample>,
}

impl PositionFeed for SimFeed {
    fn subscribe(&mut self, provider: ProviderClass, request: SubscriptionRequest) {
        info!(
            "FEED    | subscribed {provider} (>= {} ms, >= {} m)",
            request.min_interval_ms, request.min_distance_m
        );
        self.subscriptions.push((provider, request));
    }

    fn unsubscribe(&mut self, provider: ProviderClass) {
        self.subscriptions.retain(|(p, _)| *p != provider);
    }

    fn last_known(&self, provider: ProviderClass) -> Option<PositionSample> {
        self.cached.get(&provider).copied()
    }
}

/// Records the repeating-timer registration.
#[derive(Default)]
struct SimTimer {
    interval_ms: Option<u32>,
}

impl ReportTimer for SimTimer {
    fn schedule_repeating(&mut self, interval_ms: u32) {
        info!("TIMER   | repeating every {interval_ms} ms");
        self.interval_ms = Some(interval_ms);
    }

    fn cancel(&mut self) {
        self.interval_ms = None;
    }
}

/// Manually advanced wall clock.
struct SimClock {
    now_ms: u64,
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

// ── Scripted events ───────────────────────────────────────────

enum SimEvent {
    Text { body: &'static str, origin: &'static str },
    Fix(PositionSample),
    Tick,
}

fn fix(provider: ProviderClass, lat: f64, lon: f64, accuracy_m: f32, at_ms: u64) -> PositionSample {
    PositionSample {
        lat,
        lon,
        accuracy_m: Some(accuracy_m),
        observed_at_ms: at_ms,
        provider,
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  phonefinder sim v{}              ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = LocatorConfig::default();
    let tick_ms = u64::from(config.report_interval_ms);

    let mut service = SessionService::new(config);
    let mut feed = SimFeed::default();
    let mut timer = SimTimer::default();
    let mut outbox = ConsoleOutbox { sent: 0 };
    let mut store = MemoryStore::new();
    let mut sink = LogEventSink::new();
    let mut clock = SimClock { now_ms: 1_700_000_000_000 };

    // A cached fix from before the session, so seeding has something.
    feed.cached.insert(
        ProviderClass::Gps,
        fix(ProviderClass::Gps, 59.3326, 18.0649, 28.0, clock.now_ms - 720_000),
    );

    let mut script: VecDeque<SimEvent> = VecDeque::from([
        SimEvent::Text { body: "please WHEREISMYPHONE now", origin: "+15551234" },
        SimEvent::Fix(fix(ProviderClass::Network, 59.3329, 18.0653, 60.0, 0)),
        SimEvent::Tick,
        SimEvent::Fix(fix(ProviderClass::Gps, 59.3341, 18.0702, 12.0, 0)),
        SimEvent::Tick,
        SimEvent::Tick,
        SimEvent::Tick,
        SimEvent::Tick,
        SimEvent::Tick, // forced duplicate lands here
        SimEvent::Text { body: "whereismyphone stop", origin: "+15551234" },
    ]);

    // One logical actor: events are drained and handled in order, never
    // concurrently — the same discipline the device event queue enforces.
    while let Some(event) = script.pop_front() {
        match event {
            SimEvent::Text { body, origin } => {
                info!("INBOX   | from {origin}: \"{body}\"");
                let disposition = service.handle_message(
                    body, origin, &mut feed, &mut timer, &mut outbox, &mut store, &clock,
                    &mut sink,
                );
                info!("INBOX   | disposition: {disposition:?}");
            }
            SimEvent::Fix(mut sample) => {
                sample.observed_at_ms = clock.now_ms;
                service.handle_sample(sample, &mut sink);
            }
            SimEvent::Tick => {
                clock.now_ms += tick_ms;
                service.handle_tick(&mut feed, &mut timer, &mut outbox, &mut store, &mut sink);
            }
        }

        if let Some(state) = service.session() {
            log::debug!("state: {}", serde_json::to_string(state)?);
        }
    }

    let state_after_stop = service.session();
    anyhow::ensure!(state_after_stop.is_none(), "session must be torn down");
    info!("done: {} outbound messages, session cleanly stopped", outbox.sent);
    Ok(())
}
