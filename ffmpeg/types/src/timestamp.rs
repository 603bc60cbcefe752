/*!
    Timestamp types for media timing.
*/

use std::time::Duration;

use crate::Rational;
use crate::rational::rescale;

/**
    Presentation or decode timestamp in time_base units.

    The raw value means nothing without the time base of the stream or
    codec it came from, so values are always carried next to one.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    /**
        Convert this timestamp from one time base to another.
    */
    #[inline]
    pub fn rescale(self, from: Rational, to: Rational) -> Self {
        Self(rescale(self.0, from, to))
    }

    /**
        Convert this PTS to a Duration using the given time base.

        Negative PTS values are clamped to zero.
    */
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        if self.0 <= 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.0 as f64 * time_base.to_f64())
    }
}

impl From<i64> for Pts {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/**
    Duration in time_base units.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaDuration(pub i64);

impl MediaDuration {
    /**
        Convert this duration from one time base to another.
    */
    #[inline]
    pub fn rescale(self, from: Rational, to: Rational) -> Self {
        Self(rescale(self.0, from, to))
    }
}
