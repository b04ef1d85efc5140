//! Numeric helpers shared by sampling and summarisation.

/// How a percentile interpolates between order statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentileMethod {
    /// Hyndman-Fan type 7, the usual linear interpolation.
    Linear,
    /// Hyndman-Fan type 8, approximately median-unbiased.
    MedianUnbiased,
}

/// The `p`-th percentile (0-100) of `values`. Returns `None` when empty.
pub fn percentile(values: &[f64], p: f64, method: PercentileMethod) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let q = (p / 100.0).clamp(0.0, 1.0);
    let index = match method {
        PercentileMethod::Linear => (n - 1.0) * q,
        PercentileMethod::MedianUnbiased => {
            let third = 1.0 / 3.0;
            n * q + (third + q * (1.0 - 2.0 * third)) - 1.0
        }
    }
    .clamp(0.0, n - 1.0);

    let lo = index.floor() as usize;
    let hi = index.ceil() as usize;
    let frac = index - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Rounds half away from zero to the nearest multiple of `step`.
pub fn round_to_step(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        let p40 = percentile(&v, 40.0, PercentileMethod::Linear).unwrap();
        assert!((p40 - 2.6).abs() < 1e-12);
        assert_eq!(percentile(&v, 100.0, PercentileMethod::Linear), Some(5.0));
        assert_eq!(percentile(&[], 50.0, PercentileMethod::Linear), None);
    }

    #[test]
    fn median_unbiased_matches_reference_values() {
        let v = [1.0, 2.0, 3.0, 4.0];
        // index = 4 * 0.5 + 1/3 + 0.5/3 - 1 = 1.5
        let m = percentile(&v, 50.0, PercentileMethod::MedianUnbiased).unwrap();
        assert!((m - 2.5).abs() < 1e-12);
        // index = 4 * 0.15 + 1/3 + 0.05 - 1 = -0.01666 -> clamped to 0
        let low = percentile(&v, 15.0, PercentileMethod::MedianUnbiased).unwrap();
        assert_eq!(low, 1.0);
    }

    #[test]
    fn round_to_quarter() {
        assert_eq!(round_to_step(20.13, 0.25), 20.25);
        assert_eq!(round_to_step(20.12, 0.25), 20.0);
    }
}
