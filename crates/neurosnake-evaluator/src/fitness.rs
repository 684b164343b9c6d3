//! Fitness of a single trial.
//!
//! ```text
//! r       = length / max_length
//! fitness = 10·moves − 6·moves·(1 − r)² + (length − 1)^(2 + 6r) · max_length · moves
//! ```
//!
//! A snake that never ate scores 0 regardless of how long it survived.
//! Otherwise the linear survival reward is reduced by a penalty that shrinks
//! as the snake fills the board, and the length term grows super-linearly
//! with both length and fill ratio. Once the snake is reasonably long the
//! length term dominates, so selection favours growth over stalling.

/// Length of a snake that has not eaten.
pub const MIN_LENGTH: usize = 1;

/// Computes the fitness of one trial.
///
/// `max_length` is the number of board cells.
///
/// # Examples
///
/// ```
/// use neurosnake_evaluator::fitness::fitness;
///
/// assert_eq!(fitness(500, 1, 100), 0.0);
/// assert!(fitness(100, 10, 100) > fitness(100, 5, 100));
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn fitness(moves: usize, length: usize, max_length: usize) -> f64 {
    if length <= MIN_LENGTH || max_length == 0 {
        return 0.0;
    }
    let moves = moves as f64;
    let length = length as f64;
    let max_length = max_length as f64;
    let ratio = length / max_length;

    let survival = 10.0 * moves;
    let stalling = 6.0 * moves * (1.0 - ratio).powi(2);
    let growth = (length - 1.0).powf(2.0 + 6.0 * ratio) * max_length * moves;
    survival - stalling + growth
}

/// Arithmetic mean, 0 for an empty slice.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
