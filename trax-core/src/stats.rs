use num_traits::ToPrimitive;

/// Arithmetic mean of a slice. NaN on empty input.
pub fn mean<T: ToPrimitive>(values: &[T]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = values.iter().map(|v| v.to_f64().unwrap_or(0.0)).sum();
    sum / values.len() as f64
}

/// Mean over the half-open index range `[start, end)` of `values`, with the
/// range clamped to the slice. NaN when nothing of the range is in bounds.
pub fn window_mean<T: ToPrimitive>(values: &[T], start: usize, end: usize) -> f64 {
    let end = end.min(values.len());
    if start >= end {
        return f64::NAN;
    }
    mean(&values[start..end])
}

/// Convert a phred-scaled quality to an error probability: `10^(-q/10)`.
pub fn phred_to_error_prob(q: f64) -> f64 {
    10f64.powf(-q / 10.0)
}

/// Convert an error probability back to the phred scale: `-10 * log10(p)`.
pub fn error_prob_to_phred(p: f64) -> f64 {
    -10.0 * p.log10()
}
