//! Drop-based rate limiting for pointer-move events.
//!
//! DESIGN
//! ======
//! A single `last_accepted` timestamp. An event arriving before
//! `last_accepted + interval` is discarded outright: nothing is queued and
//! nothing is coalesced, so bursts during fast motion are thinned rather than
//! delayed. Timestamps are milliseconds on any monotonic clock the host
//! supplies (DOM `event.timeStamp`, or elapsed time in native hosts).
//!
//! Only moves go through the throttle. Gesture start and end are always
//! processed so a stroke's endpoints are exact.

#[cfg(test)]
#[path = "throttle_test.rs"]
mod throttle_test;

use crate::consts::THROTTLE_INTERVAL_MS;

#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: f64,
    last_accepted_ms: Option<f64>,
}

impl Throttle {
    #[must_use]
    pub fn new(interval_ms: f64) -> Self {
        Self { interval_ms, last_accepted_ms: None }
    }

    #[must_use]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Timestamp of the most recently accepted event.
    #[must_use]
    pub fn last_accepted_ms(&self) -> Option<f64> {
        self.last_accepted_ms
    }

    /// Accept or drop an event observed at `now_ms`.
    ///
    /// The first event is always accepted. Later events are accepted once
    /// `now_ms - last_accepted >= interval`, which also moves `last_accepted`.
    pub fn accept_at(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_accepted_ms {
            if now_ms - last < self.interval_ms {
                return false;
            }
        }
        self.last_accepted_ms = Some(now_ms);
        true
    }

    /// Forget the last accepted timestamp.
    pub fn reset(&mut self) {
        self.last_accepted_ms = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(THROTTLE_INTERVAL_MS)
    }
}
