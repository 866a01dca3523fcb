//! Vector utility functions like max(), almost_equal(), rel_discrepancy()
pub fn max(vec: &[f64]) -> f64 {
    vec.iter().cloned().fold(0.0, f64::max)
}

/// Scales `v` in place so that its entries sum to 1.0.
///
/// Leaves the slice untouched when its sum is zero.
pub fn normalize_in_place(v: &mut [f64]) {
    let total: f64 = v.iter().sum();
    if total > 0.0 {
        for x in v.iter_mut() {
            *x /= total;
        }
    }
}

/// Checks if two arrays or vectors are almost equal.
///
/// Elements in both containers must be in the same order.
pub fn almost_equal(a: &[f64], b: &[f64], eps: f64) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(&x, &y)| (x - y).abs() <= eps)
}

/// Relative discrepancy between two totals.
///
/// Scaled by the larger magnitude of the two; two near-zero totals compare
/// as identical so that empty zones never trip the conservation check.
pub fn rel_discrepancy(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale < f64::EPSILON {
        return 0.0;
    }
    (a - b).abs() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max() {
        assert_eq!(max(&[1.0, 3.0, 2.0]), 3.0);
        assert_eq!(max(&[42.0]), 42.0);
        assert_eq!(max(&[]), 0.0);
    }

    #[test]
    fn test_normalize_in_place() {
        let mut v = vec![1.0, 3.0];
        normalize_in_place(&mut v);
        assert!(almost_equal(&v, &[0.25, 0.75], 1e-12));

        let mut zeros = vec![0.0, 0.0];
        normalize_in_place(&mut zeros);
        assert!(
            almost_equal(&zeros, &[0.0, 0.0], 1e-12),
            "zero vector untouched"
        );
    }

    #[test]
    fn test_almost_equal_true() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.0, 2.0, 3.0];
        assert!(almost_equal(&a, &b, 1e-10));
    }

    #[test]
    fn test_almost_equal_false() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.0, 2.0, 4.0];
        assert!(!almost_equal(&a, &b, 1e-10));
    }

    #[test]
    fn test_almost_equal_different_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert!(!almost_equal(&a, &b, 1e-10));
    }

    #[test]
    fn test_rel_discrepancy() {
        assert!(rel_discrepancy(0.0, 0.0) == 0.0);
        assert!((rel_discrepancy(100.0, 99.0) - 0.01).abs() < 1e-12);
        assert!(rel_discrepancy(0.0, 1.0) == 1.0);
    }
}
