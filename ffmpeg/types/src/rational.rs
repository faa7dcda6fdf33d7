/*!
    Rational number type for time bases and frame rates.
*/

use std::fmt;

/**
    A rational number with the same layout as the native `AVRational`.

    Used for time bases (e.g., 1/90000 for MPEG-TS) and frame rates
    (e.g., 24000/1001 for 23.976 fps).
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    /**
        Create a new rational number.

        # Panics

        Panics if `den` is zero.
    */
    #[inline]
    pub const fn new(num: i32, den: i32) -> Self {
        assert!(den != 0, "denominator cannot be zero");
        Self { num, den }
    }

    /**
        Frame rate of a whole number of frames per second.
    */
    #[inline]
    pub const fn fps(frames: i32) -> Self {
        Self::new(frames, 1)
    }

    /**
        Returns false for the `0/0` and `x/0` values the native side uses
        for "unknown".
    */
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.num != 0 && self.den != 0
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /**
        Swap numerator and denominator, turning a frame rate into a time base.

        # Panics

        Panics if numerator is zero.
    */
    #[inline]
    pub const fn invert(self) -> Self {
        assert!(self.num != 0, "cannot invert zero");
        Self {
            num: self.den,
            den: self.num,
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num, den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "denominator cannot be zero")]
    fn zero_denominator_panics() {
        Rational::new(1, 0);
    }

    #[test]
    fn fps_and_time_base() {
        let rate = Rational::fps(25);
        assert_eq!(rate.invert(), Rational::new(1, 25));
        assert_eq!(rate.to_f64(), 25.0);
    }

    #[test]
    fn validity() {
        assert!(Rational::new(30000, 1001).is_valid());
        assert!(!Rational { num: 0, den: 0 }.is_valid());
        assert!(!Rational { num: 0, den: 1 }.is_valid());
    }

    #[test]
    #[should_panic(expected = "cannot invert zero")]
    fn invert_zero_panics() {
        Rational::new(0, 1).invert();
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Rational::new(1, 90000)), "1/90000");
        assert_eq!(Rational::from((24000, 1001)).to_string(), "24000/1001");
    }
}
