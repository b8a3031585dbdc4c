//! Locator configuration parameters
//!
//! All tunable parameters for the phonefinder session core. Values are
//! plain data: the service takes a config at construction and never reads
//! ambient state.

use serde::{Deserialize, Serialize};

/// Core locator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    // --- Command matching ---
    /// Substring that must appear in an inbound text to address us.
    /// Stored lower-case; matching is ASCII case-insensitive.
    pub trigger_phrase: String,
    /// Substring that, together with the trigger, ends the session.
    pub stop_phrase: String,

    // --- Reporting ---
    /// Interval between report ticks (milliseconds). Inexact by contract.
    pub report_interval_ms: u32,
    /// Reports sent before the session self-terminates.
    pub max_reports: u16,
    /// Stale ticks tolerated before a duplicate report is forced.
    pub same_position_streak: u8,
    /// Persist the remaining-report counter when it is a multiple of this.
    pub counter_checkpoint_every: u16,

    // --- Position feed ---
    /// Minimum interval between provider updates (milliseconds).
    pub feed_min_interval_ms: u32,
    /// Minimum displacement between provider updates (meters).
    pub feed_min_distance_m: f32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            // Command matching
            trigger_phrase: "whereismyphone".to_owned(),
            stop_phrase: "stop".to_owned(),

            // Reporting
            report_interval_ms: 30 * 60 * 1000, // half-hour cadence
            max_reports: 50,
            same_position_streak: 4,
            counter_checkpoint_every: 10,

            // Position feed
            feed_min_interval_ms: 5 * 60 * 1000,
            feed_min_distance_m: 100.0,
        }
    }
}
