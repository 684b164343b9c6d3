//! Dense vector and matrix kernels used by the forward pass.
//!
//! Matrices are row-major `Vec<Vec<f32>>` with one row per output, matching
//! the exported `weights[layer][out][in]` layout.

/// Computes `matrix · input` into `out`.
///
/// # Panics
///
/// Panics if a row's length differs from `input.len()`.
pub fn mat_vec_mul_into(matrix: &[Vec<f32>], input: &[f32], out: &mut Vec<f32>) {
    out.clear();
    out.extend(matrix.iter().map(|row| dot(row, input)));
}

#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "dot product length mismatch");
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Elementwise `acc += other`.
pub fn add_assign(acc: &mut [f32], other: &[f32]) {
    assert_eq!(acc.len(), other.len(), "vector length mismatch");
    for (a, b) in acc.iter_mut().zip(other) {
        *a += b;
    }
}

/// Index of the largest value; the first one wins ties.
///
/// NaN values are never selected. Returns `None` for an empty slice or one
/// holding only NaN.
#[must_use]
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, v) in values.iter().copied().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Clamps every value into `[min, max]`.
pub fn clamp_all(values: &mut [f32], min: f32, max: f32) {
    for v in values {
        *v = v.clamp(min, max);
    }
}
