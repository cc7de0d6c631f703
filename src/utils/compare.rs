//! Tolerance-based series comparison

/// Compare two series element-wise within an absolute tolerance
///
/// Returns `(true, "")` when every pair satisfies `|a - b| <= tol`.
/// Otherwise returns `false` and a message naming the first mismatching
/// index, or the differing lengths.
///
/// # Example
///
/// ```
/// use blocksim::utils::verify_equal;
///
/// let (ok, msg) = verify_equal(&[1.0, 2.0], &[1.0, 2.5], 1e-9);
/// assert!(!ok);
/// assert_eq!(msg, "Index [1]: 2 is not equal to 2.5");
/// ```
pub fn verify_equal(actual: &[f64], expected: &[f64], tol: f64) -> (bool, String) {
    if actual.len() != expected.len() {
        return (
            false,
            format!(
                "Length mismatch: {} is not equal to {}",
                actual.len(),
                expected.len()
            ),
        );
    }

    for (k, (a, b)) in actual.iter().zip(expected).enumerate() {
        // exact match first so equal infinities compare equal
        if a == b {
            continue;
        }
        let diff = (a - b).abs();
        if diff.is_nan() || diff > tol {
            return (false, format!("Index [{}]: {} is not equal to {}", k, a, b));
        }
    }
    (true, String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_within_tolerance() {
        let (ok, msg) = verify_equal(&[0.1 + 0.2, 1.0], &[0.3, 1.0], 1e-12);
        assert!(ok);
        assert!(msg.is_empty());
    }

    #[test]
    fn test_first_mismatch_reported() {
        let (ok, msg) = verify_equal(&[1.0, 5.0, 7.0], &[1.0, 2.0, 3.0], 0.5);
        assert!(!ok);
        assert_eq!(msg, "Index [1]: 5 is not equal to 2");
    }

    #[test]
    fn test_nan_never_equal() {
        let (ok, _) = verify_equal(&[f64::NAN], &[f64::NAN], 1.0);
        assert!(!ok);
    }

    #[test]
    fn test_length_mismatch() {
        let (ok, msg) = verify_equal(&[1.0], &[1.0, 2.0], 0.0);
        assert!(!ok);
        assert!(msg.starts_with("Length mismatch"));
    }
}
