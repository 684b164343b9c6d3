/// Value at rank `floor(n * numerator / denominator)` of sorted data.
///
/// Nearest-rank lookup without interpolation, clamped to the last index.
/// The quartiles are the values at `floor(n/4)`, `floor(n/2)` and
/// `floor(3n/4)`. Integer arithmetic keeps large `n` from rounding to a
/// neighbouring rank.
///
/// Returns `None` if the input is empty.
///
/// # Examples
///
/// ```
/// use neurosnake_stats::percentiles::rank_fraction;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(rank_fraction(&values, 1, 2), Some(3.0));
/// assert_eq!(rank_fraction(&values, 1, 4), Some(2.0));
/// assert_eq!(rank_fraction(&values, 1, 1), Some(5.0));
/// ```
#[must_use]
pub fn rank_fraction(sorted_values: &[f64], numerator: usize, denominator: usize) -> Option<f64> {
    let last = sorted_values.len().checked_sub(1)?;
    let idx = (sorted_values.len() * numerator / denominator).min(last);
    Some(sorted_values[idx])
}
