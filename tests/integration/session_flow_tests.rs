//! End-to-end session flows: inbound text → session → reports → teardown.
//!
//! These exercise the full command-dispatch chain from a received trigger
//! text down to outbound report texts and persisted state, entirely
//! against the mock ports.

use crate::mock_ports::{fix, Harness};

use phonefinder::app::events::{AppEvent, EndReason};
use phonefinder::app::service::MessageDisposition;
use phonefinder::config::LocatorConfig;
use phonefinder::location::ProviderClass;
use phonefinder::session::SessionState;

// ── Session start ─────────────────────────────────────────────

#[test]
fn trigger_text_starts_session_with_full_budget() {
    let mut h = Harness::new();

    let disposition = h.message("please WHEREISMYPHONE now", "+15551234");

    assert_eq!(disposition, MessageDisposition::Consumed);
    assert!(h.service.is_active());

    let session = h.service.session().unwrap();
    assert_eq!(session.recipient, "+15551234");
    assert_eq!(session.remaining_reports, 50);
    assert_eq!(session.same_position_streak, 4);

    // All three provider classes subscribed with the configured request.
    let providers: Vec<ProviderClass> = h.feed.subscribed.iter().map(|(p, _)| *p).collect();
    assert_eq!(
        providers,
        vec![ProviderClass::Gps, ProviderClass::Network, ProviderClass::Passive]
    );
    let (_, request) = h.feed.subscribed[0];
    assert_eq!(request.min_interval_ms, 5 * 60 * 1000);
    assert!((request.min_distance_m - 100.0).abs() < f32::EPSILON);

    // Half-hour repeating timer registered, state persisted.
    assert_eq!(h.timer.interval_ms, Some(30 * 60 * 1000));
    assert!(SessionState::is_persisted(&h.store));
}

#[test]
fn unrelated_text_passes_through_untouched() {
    let mut h = Harness::new();
    assert_eq!(
        h.message("see you at eight", "+15551234"),
        MessageDisposition::Passthrough
    );
    assert!(!h.service.is_active());
    assert!(h.outbox.attempts.is_empty());
}

#[test]
fn session_start_reports_cached_fix_with_age() {
    let mut h = Harness::new();
    let twelve_min_ago = h.clock.now_ms - 720_000;
    h.feed.cached.insert(
        ProviderClass::Gps,
        fix(ProviderClass::Gps, 59.3326, 18.0649, Some(28.0), twelve_min_ago),
    );

    h.message("whereismyphone", "+15551234");

    let (recipient, body) = h.last_sent().unwrap();
    assert_eq!(recipient, "+15551234");
    assert_eq!(
        body,
        "http://maps.google.com/maps?q=59.3326,18.0649 Accuracy:28 Time:12 min ago"
    );
    // The seed report spends budget like any other.
    assert_eq!(h.service.session().unwrap().remaining_reports, 49);
}

#[test]
fn seeding_prefers_tighter_of_gps_and_passive() {
    let mut h = Harness::new();
    h.feed.cached.insert(
        ProviderClass::Gps,
        fix(ProviderClass::Gps, 1.0, 1.0, Some(40.0), h.clock.now_ms),
    );
    h.feed.cached.insert(
        ProviderClass::Passive,
        fix(ProviderClass::Passive, 2.0, 2.0, Some(15.0), h.clock.now_ms),
    );
    // Network's cached fix is never consulted for seeding.
    h.feed.cached.insert(
        ProviderClass::Network,
        fix(ProviderClass::Network, 3.0, 3.0, Some(1.0), h.clock.now_ms),
    );

    h.message("whereismyphone", "+15551234");

    let best = h.service.best().unwrap();
    assert_eq!(best.lat, 2.0, "passive fix was tighter");
}

// ── Report ticks ──────────────────────────────────────────────

#[test]
fn tick_without_any_fix_reports_no_location() {
    let mut h = Harness::new();
    h.message("whereismyphone", "+15551234");

    h.tick();

    assert_eq!(h.last_sent().unwrap().1, "no location");
    assert_eq!(h.service.session().unwrap().remaining_reports, 49);
}

#[test]
fn fresh_fix_is_reported_on_next_tick() {
    let mut h = Harness::new();
    h.message("whereismyphone", "+15551234");
    h.sample(fix(ProviderClass::Gps, 59.0, 18.0, Some(20.0), h.clock.now_ms));

    h.tick();

    assert_eq!(
        h.last_sent().unwrap().1,
        "http://maps.google.com/maps?q=59,18 Accuracy:20m"
    );
}

#[test]
fn worse_fix_at_same_spot_does_not_refresh() {
    let mut h = Harness::new();
    h.message("whereismyphone", "+15551234");

    h.sample(fix(ProviderClass::Gps, 59.0, 18.0, Some(20.0), h.clock.now_ms));
    h.tick(); // reports the 20 m fix
    h.sample(fix(ProviderClass::Network, 59.0, 18.0, Some(35.0), h.clock.now_ms));
    h.tick(); // stale: streak burns, nothing sent

    assert_eq!(h.outbox.attempts.len(), 1);
    assert!(h
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::SampleRejected { provider: ProviderClass::Network })));
}

#[test]
fn four_stale_ticks_force_one_same_position_report() {
    let mut h = Harness::new();
    h.message("whereismyphone", "+15551234");
    h.sample(fix(ProviderClass::Gps, 59.0, 18.0, Some(20.0), h.clock.now_ms));
    h.tick(); // fresh report

    for _ in 0..3 {
        h.tick(); // suppressed
    }
    assert_eq!(h.outbox.attempts.len(), 1);

    h.tick(); // 4th stale tick: forced duplicate

    assert_eq!(h.outbox.attempts.len(), 2);
    assert_eq!(
        h.last_sent().unwrap().1,
        "same http://maps.google.com/maps?q=59,18 Accuracy:20m"
    );
    assert_eq!(h.service.session().unwrap().same_position_streak, 4);

    let suppressed = h
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::ReportSuppressed { .. }))
        .count();
    assert_eq!(suppressed, 3);
}

#[test]
fn transport_failure_still_advances_session_state() {
    let mut h = Harness::new();
    h.outbox.fail_all = true;
    h.message("whereismyphone", "+15551234");

    h.tick();

    assert_eq!(h.outbox.attempts.len(), 1, "send was attempted");
    assert_eq!(
        h.service.session().unwrap().remaining_reports,
        49,
        "budget advances even when the transport refuses"
    );
    assert!(h
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::SendFailed { .. })));
}

// ── Session end ───────────────────────────────────────────────

#[test]
fn stop_text_tears_the_session_down() {
    let mut h = Harness::new();
    h.message("whereismyphone", "+15551234");
    h.tick();
    let sent_before = h.outbox.attempts.len();

    let disposition = h.message("whereismyphone stop", "+15551234");

    assert_eq!(disposition, MessageDisposition::Consumed);
    assert!(!h.service.is_active());
    assert!(h.feed.subscribed.is_empty(), "feeds unregistered");
    assert_eq!(h.timer.interval_ms, None, "timer cancelled");
    assert!(!SessionState::is_persisted(&h.store), "state cleared");

    // Stale events queued behind the stop are ignored.
    h.tick();
    h.sample(fix(ProviderClass::Gps, 1.0, 1.0, Some(5.0), h.clock.now_ms));
    assert_eq!(h.outbox.attempts.len(), sent_before);
    assert!(h.service.best().is_none());
}

#[test]
fn final_report_is_marked_and_session_ends() {
    let config = LocatorConfig {
        max_reports: 2,
        ..LocatorConfig::default()
    };
    let mut h = Harness::with_config(config);
    h.message("whereismyphone", "+15551234");

    h.tick();
    assert_eq!(h.last_sent().unwrap().1, "no location");
    assert!(h.service.is_active());

    h.tick();
    assert_eq!(h.last_sent().unwrap().1, "no location (last message)");
    assert!(!h.service.is_active());
    assert!(!SessionState::is_persisted(&h.store));
    assert!(h.feed.subscribed.is_empty());
    assert!(h
        .sink
        .events
        .iter()
        .any(|e| matches!(
            e,
            AppEvent::SessionEnded {
                reason: EndReason::ReportsExhausted
            }
        )));
}

#[test]
fn restart_while_active_replaces_cleanly() {
    let mut h = Harness::new();
    h.message("whereismyphone", "+15550001");
    for _ in 0..3 {
        h.tick();
    }
    assert_eq!(h.service.session().unwrap().remaining_reports, 47);

    h.message("whereismyphone", "+15550002");

    let session = h.service.session().unwrap();
    assert_eq!(session.recipient, "+15550002");
    assert_eq!(session.remaining_reports, 50, "budget restarts");
    assert_eq!(
        h.feed.subscribed.len(),
        3,
        "feeds never double-registered across the replacement"
    );
    assert!(h
        .sink
        .events
        .iter()
        .any(|e| matches!(
            e,
            AppEvent::SessionEnded {
                reason: EndReason::Replaced
            }
        )));
}

// ── Restart / resume ──────────────────────────────────────────

#[test]
fn reboot_resumes_from_last_checkpoint() {
    let mut h = Harness::new();
    h.message("whereismyphone", "+15551234");
    for _ in 0..11 {
        h.tick(); // "no location" each time: 50 -> 39
    }
    assert_eq!(h.service.session().unwrap().remaining_reports, 39);

    // Process restart: in-memory state is gone, the store survives.
    let mut h = h.restart(LocatorConfig::default());
    assert!(!h.service.is_active());

    h.resume();

    let session = h.service.session().unwrap();
    assert_eq!(session.recipient, "+15551234");
    assert_eq!(
        session.remaining_reports, 40,
        "resume picks up the multiple-of-ten checkpoint"
    );
    assert_eq!(session.same_position_streak, 4, "streak rebuilds at threshold");
    assert_eq!(h.feed.subscribed.len(), 3);
    assert_eq!(h.timer.interval_ms, Some(30 * 60 * 1000));
}

#[test]
fn reboot_with_no_persisted_session_stays_idle() {
    let mut h = Harness::new();
    h.resume();
    assert!(!h.service.is_active());
    assert!(h.feed.subscribed.is_empty());
    assert_eq!(h.timer.interval_ms, None);
    assert!(h.outbox.attempts.is_empty());
}

#[test]
fn stop_after_reboot_clears_stale_record_without_resume() {
    let mut h = Harness::new();
    h.message("whereismyphone", "+15551234");

    // Reboot, but the stop text arrives before any resume signal.
    let mut h = h.restart(LocatorConfig::default());
    assert!(SessionState::is_persisted(&h.store));

    h.message("whereismyphone stop", "+15551234");

    assert!(!SessionState::is_persisted(&h.store));
    h.resume();
    assert!(!h.service.is_active(), "nothing left to resume");
}
