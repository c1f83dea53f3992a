//! Closed integer intervals used for cumul and slack domains.

/// Closed interval `[min, max]`. Empty when `min > max`.
///
/// # Examples
/// ```
/// use reload_core::Bounds;
///
/// let reach = Bounds::new(0, 10).offset(5).intersect(Bounds::new(8, 20));
/// assert_eq!(reach, Bounds::new(8, 15));
/// assert!(!reach.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    /// Smallest admissible value.
    pub min: i64,
    /// Largest admissible value.
    pub max: i64,
}

impl Bounds {
    /// Construct an interval.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Single-value interval.
    #[must_use]
    pub const fn exactly(value: i64) -> Self {
        Self::new(value, value)
    }

    /// Whether the interval admits no value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Whether `value` lies inside the interval.
    #[must_use]
    pub const fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Intersection of two intervals.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Shift both ends by `delta`.
    #[must_use]
    pub const fn offset(self, delta: i64) -> Self {
        Self::new(
            self.min.saturating_add(delta),
            self.max.saturating_add(delta),
        )
    }

    /// Interval sum: every `a + b` with `a` in `self` and `b` in `other`.
    #[must_use]
    pub const fn widen(self, other: Self) -> Self {
        Self::new(
            self.min.saturating_add(other.min),
            self.max.saturating_add(other.max),
        )
    }

    /// Interval difference: every `a - b` with `a` in `self` and `b` in `other`.
    #[must_use]
    pub const fn narrow(self, other: Self) -> Self {
        Self::new(
            self.min.saturating_sub(other.max),
            self.max.saturating_sub(other.min),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Bounds::new(0, 5), Bounds::new(6, 9), true)]
    #[case(Bounds::new(0, 5), Bounds::new(5, 9), false)]
    #[case(Bounds::new(3, 3), Bounds::new(0, 9), false)]
    fn intersection_detects_disjoint(
        #[case] lhs: Bounds,
        #[case] rhs: Bounds,
        #[case] empty: bool,
    ) {
        assert_eq!(lhs.intersect(rhs).is_empty(), empty);
    }

    #[rstest]
    fn widen_and_narrow_are_inverse_on_points() {
        let slack = Bounds::new(0, 4);
        let widened = Bounds::exactly(10).widen(slack);
        assert_eq!(widened, Bounds::new(10, 14));
        assert_eq!(widened.narrow(slack), Bounds::new(6, 14));
    }

    #[rstest]
    fn offset_saturates() {
        let shifted = Bounds::new(0, i64::MAX).offset(1);
        assert_eq!(shifted.max, i64::MAX);
        assert_eq!(shifted.min, 1);
    }
}
