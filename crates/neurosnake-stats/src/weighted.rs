//! Fitness-proportional ("roulette wheel") index selection.

use rand::Rng;

/// Picks an index with probability proportional to its weight.
///
/// Draws a threshold uniformly from `[0, total)` and scans the weights in
/// order, returning the first index whose running sum exceeds it; equal
/// weights are therefore resolved by scan order. Negative and NaN weights
/// count as zero.
///
/// Returns `None` when no weight is positive.
///
/// # Examples
///
/// ```
/// use neurosnake_stats::weighted::select_index;
///
/// let mut rng = rand::rng();
/// assert_eq!(select_index(&[0.0, 3.0, 0.0], &mut rng), Some(1));
/// assert_eq!(select_index(&[0.0, 0.0], &mut rng), None);
/// ```
pub fn select_index<R>(weights: &[f64], rng: &mut R) -> Option<usize>
where
    R: Rng + ?Sized,
{
    select_index_by(weights.len(), |i| weights[i], rng)
}

/// Like [`select_index`] but reads weights through `weight_of`.
///
/// Useful for excluding candidates without building a filtered copy: return
/// `0.0` for excluded indices.
pub fn select_index_by<F, R>(len: usize, weight_of: F, rng: &mut R) -> Option<usize>
where
    F: Fn(usize) -> f64,
    R: Rng + ?Sized,
{
    let weight = |i| sanitize(weight_of(i));
    let total = (0..len).map(weight).sum::<f64>();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }
    let threshold = rng.random_range(0.0..total);
    let mut running = 0.0;
    let mut last_positive = None;
    for i in 0..len {
        let w = weight(i);
        if w <= 0.0 {
            continue;
        }
        running += w;
        last_positive = Some(i);
        if threshold < running {
            return Some(i);
        }
    }
    // Rounding can leave the threshold just above the final running sum.
    last_positive
}

fn sanitize(weight: f64) -> f64 {
    if weight > 0.0 { weight } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_selection_frequency_matches_weights() {
        let weights = [15.0, 20.0, 94.0, 18.0, 35.0];
        let total: f64 = weights.iter().sum();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut counts = [0usize; 5];
        let draws = 100_000;
        for _ in 0..draws {
            counts[select_index(&weights, &mut rng).unwrap()] += 1;
        }
        for (count, weight) in counts.iter().zip(weights) {
            #[expect(clippy::cast_precision_loss)]
            let freq = *count as f64 / f64::from(draws);
            assert!(
                (freq - weight / total).abs() < 0.02,
                "freq {freq} vs expected {}",
                weight / total
            );
        }
    }

    #[test]
    fn test_zero_weights_never_selected() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..1000 {
            let i = select_index(&[0.0, 1.0, -5.0, 2.0, f64::NAN], &mut rng).unwrap();
            assert!(i == 1 || i == 3);
        }
    }

    #[test]
    fn test_no_positive_weight() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(select_index(&[], &mut rng), None);
        assert_eq!(select_index(&[0.0, -1.0], &mut rng), None);
    }

    #[test]
    fn test_exclusion_through_closure() {
        let weights = [5.0, 5.0, 5.0];
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..500 {
            let i = select_index_by(3, |i| if i == 1 { 0.0 } else { weights[i] }, &mut rng);
            assert_ne!(i, Some(1));
        }
    }
}
