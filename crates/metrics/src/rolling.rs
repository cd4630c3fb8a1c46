//! Trailing-window accumulator over a nullable integer series.
//!
//! The window is positional: it always covers the last `capacity` rows of
//! the series, inclusive of the current one, while aggregates only consider
//! the non-null values inside it. This mirrors how the report series behave
//! (a missing net position occupies a week but contributes nothing).

use std::collections::VecDeque;

/// Fixed-capacity trailing window of nullable observations.
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<Option<i64>>,
}

impl RollingWindow {
    /// Creates a window covering up to `capacity` trailing rows.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Slides the window forward by one row.
    pub fn push(&mut self, value: Option<i64>) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Number of rows currently covered (null or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(min, max)` over the non-null values in the window, or `None` if the
    /// window holds no non-null value.
    #[must_use]
    pub fn range(&self) -> Option<(i64, i64)> {
        let mut bounds: Option<(i64, i64)> = None;
        for value in self.values.iter().flatten() {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(*value), hi.max(*value)),
                None => (*value, *value),
            });
        }
        bounds
    }

    /// Mean and population standard deviation (ddof = 0) over the non-null
    /// values, or `None` if the window holds no non-null value.
    ///
    /// Sums are accumulated exactly in `i128`, so the zero-variance case is
    /// detected without a floating-point epsilon: the returned std is exactly
    /// `0.0` iff all non-null values in the window are equal.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_std(&self) -> Option<(f64, f64)> {
        let mut count: i128 = 0;
        let mut sum: i128 = 0;
        let mut sum_sq: i128 = 0;
        for value in self.values.iter().flatten() {
            let v = i128::from(*value);
            count += 1;
            sum += v;
            sum_sq += v * v;
        }
        if count == 0 {
            return None;
        }

        let mean = sum as f64 / count as f64;
        // Population variance: (n * sum_sq - sum^2) / n^2, numerator exact.
        let variance_numerator = count * sum_sq - sum * sum;
        let std = if variance_numerator == 0 {
            0.0
        } else {
            (variance_numerator as f64 / (count * count) as f64).sqrt()
        };
        Some((mean, std))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_over_trailing_values() {
        let mut window = RollingWindow::new(3);
        window.push(Some(5));
        assert_eq!(window.range(), Some((5, 5)));
        window.push(Some(2));
        window.push(Some(9));
        assert_eq!(window.range(), Some((2, 9)));
    }

    #[test]
    fn oldest_value_falls_out_at_capacity() {
        let mut window = RollingWindow::new(3);
        for v in [1, 2, 3, 4] {
            window.push(Some(v));
        }
        // 1 has slid out of the 3-row window.
        assert_eq!(window.len(), 3);
        assert_eq!(window.range(), Some((2, 4)));
    }

    #[test]
    fn nulls_occupy_rows_but_do_not_aggregate() {
        let mut window = RollingWindow::new(3);
        window.push(Some(10));
        window.push(None);
        window.push(None);
        assert_eq!(window.len(), 3);
        assert_eq!(window.range(), Some((10, 10)));

        // One more push and the only non-null value is gone.
        window.push(None);
        assert_eq!(window.range(), None);
        assert_eq!(window.mean_std(), None);
    }

    #[test]
    fn mean_std_population_convention() {
        let mut window = RollingWindow::new(4);
        for v in [2, 4, 4, 6] {
            window.push(Some(v));
        }
        let (mean, std) = window.mean_std().unwrap();
        assert!((mean - 4.0).abs() < 1e-12);
        // Population variance of [2, 4, 4, 6] is 2.
        assert!((std - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn std_exactly_zero_for_constant_window() {
        let mut window = RollingWindow::new(5);
        for _ in 0..5 {
            window.push(Some(123_456));
        }
        let (mean, std) = window.mean_std().unwrap();
        assert!((mean - 123_456.0).abs() < 1e-9);
        assert_eq!(std, 0.0);
    }

    #[test]
    fn single_observation_has_zero_std() {
        let mut window = RollingWindow::new(52);
        window.push(Some(-7));
        assert_eq!(window.mean_std(), Some((-7.0, 0.0)));
    }

    #[test]
    fn large_nets_do_not_overflow() {
        // Open interest scale values, well beyond i64*i64 in a naive sum.
        let mut window = RollingWindow::new(156);
        for i in 0..156 {
            window.push(Some(3_000_000_000 + i));
        }
        let (mean, std) = window.mean_std().unwrap();
        assert!(mean > 3_000_000_000.0);
        assert!(std > 0.0);
    }

    #[test]
    #[should_panic(expected = "window capacity must be positive")]
    fn zero_capacity_panics() {
        let _ = RollingWindow::new(0);
    }
}
