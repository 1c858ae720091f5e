use foundation::math::stable_total_cmp_f64;

/// Summary statistics over expression vectors. Missing values are NaN.
pub struct Statistics;

impl Statistics {
    /// Value at fraction `p` of the sorted non-NaN values.
    ///
    /// The index is `floor(len * p)` clamped to the valid range, so `p = 1`
    /// returns the maximum. Returns NaN when no value remains.
    pub fn percentile(values: &[f64], p: f64) -> f64 {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return f64::NAN;
        }
        sorted.sort_by(|a, b| stable_total_cmp_f64(*a, *b));
        // Float to usize casts saturate: negative or NaN products land on 0.
        let index = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
        sorted[index]
    }

    /// `min(v / max, 1)` elementwise. There is no lower clamp and IEEE
    /// division rules apply, so `0 / 0` stays NaN.
    pub fn normalize(values: &[f64], max: f64) -> Vec<f64> {
        values.iter().map(|&v| (v / max).min(1.0)).collect()
    }

    /// Largest value, never below zero. NaN never wins the comparison.
    pub fn max_or_zero(values: &[f64]) -> f64 {
        values
            .iter()
            .fold(0.0, |acc, &v| if v > acc { v } else { acc })
    }

    pub fn count_zeros(values: &[f64]) -> usize {
        values.iter().filter(|&&v| v == 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;
    use pretty_assertions::assert_eq;

    #[test]
    fn percentile_uses_floor_index_over_sorted_values() {
        let values = [5.0, f64::NAN, 1.0, 4.0, 2.0, 3.0];
        // Sorted: [1, 2, 3, 4, 5]
        assert_eq!(Statistics::percentile(&values, 0.0), 1.0);
        assert_eq!(Statistics::percentile(&values, 0.5), 3.0);
        assert_eq!(Statistics::percentile(&values, 0.8), 5.0);
        assert_eq!(Statistics::percentile(&values, 0.79), 4.0);
        assert_eq!(Statistics::percentile(&values, 1.0), 5.0);
        assert_eq!(Statistics::percentile(&values, 7.0), 5.0);
    }

    #[test]
    fn percentile_of_nothing_is_nan() {
        assert!(Statistics::percentile(&[], 0.99).is_nan());
        assert!(Statistics::percentile(&[f64::NAN, f64::NAN], 0.5).is_nan());
    }

    #[test]
    fn normalize_caps_at_one_only() {
        let out = Statistics::normalize(&[-2.0, 0.0, 2.0, 8.0, f64::NAN], 4.0);
        assert_eq!(out[..4], [-0.5, 0.0, 0.5, 1.0]);
        assert!(out[4].is_nan());

        let by_zero = Statistics::normalize(&[0.0, 3.0], 0.0);
        assert!(by_zero[0].is_nan());
        assert_eq!(by_zero[1], 1.0);
    }

    #[test]
    fn max_or_zero_starts_at_zero() {
        assert_eq!(Statistics::max_or_zero(&[-3.0, -1.0]), 0.0);
        assert_eq!(Statistics::max_or_zero(&[f64::NAN, 2.5, 1.0]), 2.5);
        assert_eq!(Statistics::max_or_zero(&[]), 0.0);
    }

    #[test]
    fn counts_exact_zeros() {
        assert_eq!(Statistics::count_zeros(&[0.0, -0.0, 1e-9, f64::NAN]), 2);
    }
}
