use std::cmp::Ordering;

use derivative::Derivative;

/// Nanosecond timescale used for seek targets.
pub const NANOS_TIMESCALE: i32 = 1_000_000_000;

/// Rational media timestamp, `value / timescale` seconds.
///
/// A zero timescale marks an invalid time (engine has no answer yet), and
/// `i64::MAX` marks an indefinite one (live streams report this as duration).
#[derive(Clone, Copy, Debug, Derivative)]
#[derivative(Default)]
pub struct MediaTime {
    value: i64,
    #[derivative(Default(value = "1"))]
    timescale: i32,
}

impl MediaTime {
    pub const ZERO: Self = Self {
        value: 0,
        timescale: 1,
    };
    pub const INVALID: Self = Self {
        value: 0,
        timescale: 0,
    };
    pub const INDEFINITE: Self = Self {
        value: i64::MAX,
        timescale: 1,
    };

    #[must_use]
    pub const fn new(value: i64, timescale: i32) -> Self {
        Self { value, timescale }
    }

    /// Time at `seconds`, rounded to the nearest tick of `timescale`.
    ///
    /// Non-finite input yields [`MediaTime::INVALID`].
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn with_seconds(seconds: f64, timescale: i32) -> Self {
        if !seconds.is_finite() || timescale <= 0 {
            return Self::INVALID;
        }
        Self {
            value: (seconds * f64::from(timescale)).round() as i64,
            timescale,
        }
    }

    #[must_use]
    pub fn value(&self) -> i64 {
        self.value
    }

    #[must_use]
    pub fn timescale(&self) -> i32 {
        self.timescale
    }

    /// Seconds as a float; `0.0` for invalid times.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn seconds(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        if self.is_indefinite() {
            return f64::INFINITY;
        }
        self.value as f64 / f64::from(self.timescale)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.timescale > 0
    }

    #[must_use]
    pub fn is_indefinite(&self) -> bool {
        self.is_valid() && self.value == i64::MAX
    }

    /// Valid, finite and not negative.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_valid() && !self.is_indefinite() && self.value >= 0
    }
}

impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MediaTime {}

impl PartialOrd for MediaTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MediaTime {
    /// Invalid times sort first and compare equal to each other.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => {
                let lhs = i128::from(self.value) * i128::from(other.timescale);
                let rhs = i128::from(other.value) * i128::from(self.timescale);
                lhs.cmp(&rhs)
            }
        }
    }
}
