//! Position observations and the provider classes that produce them.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::geo;

/// The class of location provider that produced a fix.
///
/// One tagged variant per provider replaces per-provider listener
/// objects: every delivery path routes through the same
/// `handle_sample` entry point, carrying its class as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderClass {
    /// Satellite fix — slow, tight accuracy when available.
    Gps,
    /// Cell/WiFi fix — fast, coarse.
    Network,
    /// Opportunistic fixes produced for other consumers on the device.
    Passive,
}

impl ProviderClass {
    /// Every provider class, in subscription order.
    pub const ALL: [ProviderClass; 3] = [Self::Gps, Self::Network, Self::Passive];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Gps => "gps",
            Self::Network => "network",
            Self::Passive => "passive",
        }
    }
}

impl fmt::Display for ProviderClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single position observation. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Estimated accuracy radius in meters. `None` = quality unknown.
    pub accuracy_m: Option<f32>,
    /// When the fix was observed (epoch milliseconds, adapter-supplied).
    pub observed_at_ms: u64,
    /// Which provider class produced the fix.
    pub provider: ProviderClass,
}

impl PositionSample {
    pub fn has_accuracy(&self) -> bool {
        self.accuracy_m.is_some()
    }

    /// Great-circle distance to another sample, in meters.
    pub fn distance_to_m(&self, other: &PositionSample) -> f64 {
        geo::distance_m((self.lat, self.lon), (other.lat, other.lon))
    }
}
