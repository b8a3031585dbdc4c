//! Best-fix arbitration across asynchronous, multi-provider samples.
//!
//! The arbiter holds the session's current best fix plus a freshness flag
//! recording whether that fix has been reported yet. Acceptance is
//! deliberately conservative: once a fix is held, a new sample must either
//! tighten the known accuracy bound or land outside its own accuracy
//! radius around the held fix (the phone actually moved). Everything else
//! is provider noise and is dropped.
//!
//! Samples arrive push-based, unordered across providers, at any rate —
//! the rules are order-safe and idempotent, so no assumptions are made
//! about delivery.

use log::debug;

use super::sample::PositionSample;

/// Why (or whether) a sample replaced the held best fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// No fix was held; accepted unconditionally.
    FirstFix,
    /// Known accuracy, numerically tighter than the held fix's.
    BetterAccuracy,
    /// Displaced from the held fix by more than its own accuracy radius.
    Moved,
    /// Kept the held fix.
    Rejected,
}

impl Acceptance {
    pub fn accepted(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Holds the best-known fix and its freshness across one session.
///
/// Invariant: `fresh` is only ever true while a fix is held.
#[derive(Debug, Default)]
pub struct LocationArbiter {
    current: Option<PositionSample>,
    fresh: bool,
}

impl LocationArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the acceptance rules to an incoming sample.
    ///
    /// Accepting marks the fix fresh; rejecting leaves both the held fix
    /// and the freshness flag untouched.
    pub fn consider(&mut self, sample: PositionSample) -> Acceptance {
        let verdict = self.evaluate(&sample);
        if verdict.accepted() {
            debug!(
                "arbiter: accepted {} fix ({:?}, accuracy {:?})",
                sample.provider, verdict, sample.accuracy_m
            );
            self.current = Some(sample);
            self.fresh = true;
        } else {
            debug!("arbiter: rejected {} fix", sample.provider);
        }
        verdict
    }

    fn evaluate(&self, sample: &PositionSample) -> Acceptance {
        let Some(current) = &self.current else {
            return Acceptance::FirstFix;
        };
        // A sample of unknown quality never displaces a held fix.
        let Some(new_accuracy) = sample.accuracy_m else {
            return Acceptance::Rejected;
        };
        if let Some(held_accuracy) = current.accuracy_m {
            if new_accuracy < held_accuracy {
                return Acceptance::BetterAccuracy;
            }
        }
        if current.distance_to_m(sample) > f64::from(new_accuracy) {
            return Acceptance::Moved;
        }
        Acceptance::Rejected
    }

    /// The held best fix, if any.
    pub fn best(&self) -> Option<&PositionSample> {
        self.current.as_ref()
    }

    /// Whether the held fix has not yet been reported.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Read and clear the freshness flag.
    pub fn take_fresh(&mut self) -> bool {
        core::mem::take(&mut self.fresh)
    }

    /// Session-start seeding: pick the better of the two cached fixes by
    /// the tighter-accuracy rule alone.
    ///
    /// Fixes without a known accuracy never seed, and the winner is NOT
    /// marked fresh — the first periodic tick must not report purely
    /// because a cached fix existed.
    pub fn seed(&mut self, primary: Option<PositionSample>, secondary: Option<PositionSample>) {
        self.current = match (primary, secondary) {
            (Some(p), Some(s)) => match (p.accuracy_m, s.accuracy_m) {
                (Some(pa), Some(sa)) => Some(if pa < sa { p } else { s }),
                (Some(_), None) => Some(p),
                (None, Some(_)) => Some(s),
                (None, None) => None,
            },
            (Some(p), None) if p.has_accuracy() => Some(p),
            (None, Some(s)) if s.has_accuracy() => Some(s),
            _ => None,
        };
        self.fresh = false;
        debug!("arbiter: seeded with {:?}", self.current);
    }

    /// Drop all held state (session end).
    pub fn clear(&mut self) {
        self.current = None;
        self.fresh = false;
    }
}
