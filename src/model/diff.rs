//! Diff helpers shared by every `*_diff` getter.

/// Snaps magnitudes below machine epsilon to exactly zero.
pub fn epsilon_zero(value: f64) -> f64 {
    if value.abs() < f64::EPSILON {
        0.0
    } else {
        value
    }
}

/// Signed rendering of a diff: `±0`, `+1.5`, `-0.25`. Trailing zeros of the
/// fraction are dropped.
pub fn format_diff(value: f64, max_fraction_digits: usize) -> String {
    let text = format!("{:.*}", max_fraction_digits, epsilon_zero(value).abs());
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "0" {
        "±0".to_string()
    } else if value > 0.0 {
        format!("+{}", text)
    } else {
        format!("-{}", text)
    }
}
