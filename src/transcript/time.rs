//! Integer-millisecond time values.
//!
//! All engine arithmetic runs on whole milliseconds so that long offset chains
//! (one per merged audio part) never accumulate floating-point drift. Seconds
//! as `f64` exist only at the ASR boundary and in the JSON artifact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A point in time or a duration, in milliseconds from the start of the track.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Millis(pub i64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn from_secs_f64(secs: f64) -> Self {
        Millis((secs * 1000.0).round() as i64)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn from_samples(samples: usize, sample_rate: u32) -> Self {
        debug_assert!(sample_rate > 0);
        Millis((samples as i64 * 1000) / sample_rate as i64)
    }

    pub fn saturating_sub(self, other: Millis) -> Millis {
        Millis(self.0.saturating_sub(other.0))
    }

    /// `HH:MM:SS.mmm`, clamping negative values to zero.
    pub fn format_timestamp(self) -> String {
        let ms = self.0.max(0);
        let hours = ms / 3_600_000;
        let mins = (ms % 3_600_000) / 60_000;
        let secs = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;
        format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
    }
}

impl Add for Millis {
    type Output = Millis;

    fn add(self, rhs: Millis) -> Millis {
        Millis(self.0 + rhs.0)
    }
}

impl AddAssign for Millis {
    fn add_assign(&mut self, rhs: Millis) {
        self.0 += rhs.0;
    }
}

impl Sub for Millis {
    type Output = Millis;

    fn sub(self, rhs: Millis) -> Millis {
        Millis(self.0 - rhs.0)
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_timestamp())
    }
}

/// `"HH:MM:SS.mmm - HH:MM:SS.mmm"` range string used in chunk metadata.
pub fn format_range(start: Millis, end: Millis) -> String {
    format!("{} - {}", start.format_timestamp(), end.format_timestamp())
}
