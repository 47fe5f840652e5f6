use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Neg, Sub, SubAssign};

/// Hardware event counts over one interval.
///
/// Raw reads fill the fields with whole counts, values derived by combining
/// samples (e.g. averages) may be fractional. Samples should only be combined
/// with samples taken under the same counter setup.
///
/// # Examples
///
/// Track the per-field minimum and the average delta across trials:
///
/// ```rust
/// use macos_perf::PerformanceCounters;
///
/// let trials = [
///     PerformanceCounters::from_raw(120, 30, 2, 400),
///     PerformanceCounters::from_raw(100, 31, 1, 400),
/// ];
///
/// let mut min = PerformanceCounters::splat(f64::INFINITY);
/// let mut sum = PerformanceCounters::splat(0.0);
/// for t in trials {
///     min.min(t);
///     sum += t;
/// }
/// sum /= trials.len() as f64;
///
/// assert_eq!(min, PerformanceCounters::new(100.0, 30.0, 1.0, 400.0));
/// assert_eq!(sum, PerformanceCounters::new(110.0, 30.5, 1.5, 400.0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceCounters {
    pub cycles: f64,
    pub branches: f64,
    pub missed_branches: f64,
    pub instructions: f64,
}

impl PerformanceCounters {
    pub const fn new(cycles: f64, branches: f64, missed_branches: f64, instructions: f64) -> Self {
        Self {
            cycles,
            branches,
            missed_branches,
            instructions,
        }
    }

    /// Builds a sample from counts as read from the hardware.
    ///
    /// Counts below 2^53 convert exactly.
    pub fn from_raw(cycles: u64, branches: u64, missed_branches: u64, instructions: u64) -> Self {
        Self::new(
            cycles as f64,
            branches as f64,
            missed_branches as f64,
            instructions as f64,
        )
    }

    /// Builds a sample with every field set to `value`.
    ///
    /// Use `f64::INFINITY` to seed a running [`min`](Self::min),
    /// or `0.0` to seed a sum.
    pub const fn splat(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Lowers each field to the matching field of `other` if it is smaller.
    ///
    /// Fields are minimized independently, so the result may mix fields
    /// from different samples.
    pub fn min(&mut self, other: Self) -> &mut Self {
        macro_rules! min {
            ($($field:ident),+) => {
                $(if other.$field < self.$field {
                    self.$field = other.$field;
                })+
            };
        }

        min!(cycles, branches, missed_branches, instructions);
        self
    }
}

macro_rules! zip {
    ($lhs:expr, $rhs:expr, $op:tt) => {
        PerformanceCounters {
            cycles: $lhs.cycles $op $rhs.cycles,
            branches: $lhs.branches $op $rhs.branches,
            missed_branches: $lhs.missed_branches $op $rhs.missed_branches,
            instructions: $lhs.instructions $op $rhs.instructions,
        }
    };
}

macro_rules! scale {
    ($lhs:expr, $rhs:expr, $op:tt) => {
        PerformanceCounters {
            cycles: $lhs.cycles $op $rhs,
            branches: $lhs.branches $op $rhs,
            missed_branches: $lhs.missed_branches $op $rhs,
            instructions: $lhs.instructions $op $rhs,
        }
    };
}

impl Sub for PerformanceCounters {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        zip!(self, rhs, -)
    }
}

impl SubAssign for PerformanceCounters {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Add for PerformanceCounters {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        zip!(self, rhs, +)
    }
}

impl AddAssign for PerformanceCounters {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Div<f64> for PerformanceCounters {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        scale!(self, rhs, /)
    }
}

impl DivAssign<f64> for PerformanceCounters {
    fn div_assign(&mut self, rhs: f64) {
        *self = *self / rhs;
    }
}

// Averaging over a loop count.
impl Div<usize> for PerformanceCounters {
    type Output = Self;

    fn div(self, rhs: usize) -> Self {
        self / rhs as f64
    }
}

impl Neg for PerformanceCounters {
    type Output = Self;

    fn neg(self) -> Self {
        scale!(self, -1.0, *)
    }
}

impl Sum for PerformanceCounters {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::splat(0.0), Add::add)
    }
}

/// Renders how much `b` differs from `a`, relative to `a`, per field.
///
/// A positive percentage means `b` counted fewer events than `a`.
pub fn compare_perf_counters(a: &PerformanceCounters, b: &PerformanceCounters) -> String {
    let diff = *a - *b;
    let rel = |d: f64, base: f64| d / base * 100.0;
    format!(
        "cycles: {:.2}% branches: {:.2}% missed_branches: {:.2}% instructions: {:.2}%",
        rel(diff.cycles, a.cycles),
        rel(diff.branches, a.branches),
        rel(diff.missed_branches, a.missed_branches),
        rel(diff.instructions, a.instructions),
    )
}
