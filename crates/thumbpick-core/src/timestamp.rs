//! Timestamp generation (§4.1).

/// Generate the deterministic sequence of sample times, in seconds.
///
/// `t_k = k / sample_rate` for `k = 0, 1, 2, ...` while `t_k <= duration_sec`.
/// Returns an empty vector if either argument is non-positive.
pub fn generate(duration_sec: f64, sample_rate_hz: f64) -> Vec<f64> {
    if duration_sec <= 0.0 || sample_rate_hz <= 0.0 {
        return Vec::new();
    }

    let interval = 1.0 / sample_rate_hz;
    let count = (duration_sec * sample_rate_hz).floor() as i64 + 1;

    (0..count).map(|k| (k as f64 * interval).min(duration_sec)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_or_zero_inputs_are_empty() {
        assert!(generate(0.0, 1.0).is_empty());
        assert!(generate(-1.0, 1.0).is_empty());
        assert!(generate(10.0, 0.0).is_empty());
        assert!(generate(10.0, -1.0).is_empty());
    }

    // S1
    #[test]
    fn ten_seconds_at_one_hz() {
        let ts = generate(10.0, 1.0);
        assert_eq!(ts.len(), 11);
        assert_eq!(ts.first().copied(), Some(0.0));
        assert_eq!(ts.last().copied(), Some(10.0));
        for (i, t) in ts.iter().enumerate() {
            assert!((t - i as f64).abs() < 1e-9);
        }
    }

    // S2
    #[test]
    fn thirty_seconds_at_two_hz() {
        let ts = generate(30.0, 2.0);
        assert_eq!(ts.len(), 61);
        assert_eq!(ts.first().copied(), Some(0.0));
        assert_eq!(ts.last().copied(), Some(30.0));
    }

    #[test]
    fn strictly_increasing_and_bounded() {
        let ts = generate(7.3, 3.0);
        assert!(!ts.is_empty());
        assert_eq!(ts[0], 0.0);
        for t in &ts {
            assert!(*t >= 0.0 && *t <= 7.3 + 1e-9);
        }
        for w in ts.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn non_integer_product_count_matches_spec() {
        // d*r = 7.3*3 = 21.9, not integer -> count = floor(21.9) + 1 = 22
        let ts = generate(7.3, 3.0);
        assert_eq!(ts.len(), 22);
    }

    #[test]
    fn integer_product_last_equals_duration_exactly() {
        let ts = generate(10.0, 1.0);
        assert_eq!(*ts.last().unwrap(), 10.0);
    }
}
