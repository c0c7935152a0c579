//! Classification metric used for the promotion comparison.

/// F1 score for the positive class (label `1`): harmonic mean of precision
/// and recall. Returns 0.0 when undefined (no predicted positives, no actual
/// positives, or empty input).
///
/// Inputs must be the same length; in release builds the longer slice is
/// truncated to the shorter.
pub fn f1_score(y_true: &[i64], y_pred: &[i64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());

    let mut tp = 0u64;
    let mut fp = 0u64;
    let mut fn_ = 0u64;

    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t == 1, p == 1) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }

    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        return 0.0;
    }
    2.0 * tp as f64 / denom as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
