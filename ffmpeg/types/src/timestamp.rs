/*!
    Timestamp types for media timing.
*/

use std::time::Duration;

use crate::Rational;

/**
    Presentation timestamp in time_base units.

    This is the raw timestamp value from the media stream. To convert to
    a meaningful duration, you need the stream's time base.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    /**
        Convert this PTS to a Duration using the given time base.

        Negative PTS values are clamped to zero.
    */
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        ticks_to_duration(self.0, time_base)
    }

    /**
        Rescale into another time base, rounding to the nearest tick.
    */
    pub fn rescale(self, from: Rational, to: Rational) -> Self {
        let num = self.0 as i128 * from.num as i128 * to.den as i128;
        let den = from.den as i128 * to.num as i128;
        let half = den.abs() / 2;
        let rounded = if (num < 0) == (den < 0) {
            (num.abs() + half) / den.abs()
        } else {
            -((num.abs() + half) / den.abs())
        };
        Self(rounded as i64)
    }
}

/**
    Duration in time_base units.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaDuration(pub i64);

impl MediaDuration {
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        ticks_to_duration(self.0, time_base)
    }
}

fn ticks_to_duration(ticks: i64, time_base: Rational) -> Duration {
    if ticks <= 0 || !time_base.is_valid() {
        return Duration::ZERO;
    }
    Duration::from_secs_f64((ticks as f64 * time_base.to_f64()).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TB_1_1000: Rational = Rational { num: 1, den: 1000 };
    const TB_1_90000: Rational = Rational { num: 1, den: 90000 };
    const TB_1_25: Rational = Rational { num: 1, den: 25 };

    #[test]
    fn pts_to_duration() {
        assert_eq!(Pts(1000).to_duration(TB_1_1000), Duration::from_secs(1));
        assert_eq!(Pts(90000).to_duration(TB_1_90000), Duration::from_secs(1));
        assert_eq!(Pts(50).to_duration(TB_1_25), Duration::from_secs(2));
    }

    #[test]
    fn negative_pts_clamps_to_zero() {
        assert_eq!(Pts(-100).to_duration(TB_1_1000), Duration::ZERO);
        assert_eq!(MediaDuration(-1).to_duration(TB_1_1000), Duration::ZERO);
    }

    #[test]
    fn rescale_between_time_bases() {
        // frame 3 at 25 fps is 120ms
        assert_eq!(Pts(3).rescale(TB_1_25, TB_1_1000), Pts(120));
        assert_eq!(Pts(10800).rescale(TB_1_90000, TB_1_25), Pts(3));
        assert_eq!(Pts(-3).rescale(TB_1_25, TB_1_1000), Pts(-120));
    }
}
