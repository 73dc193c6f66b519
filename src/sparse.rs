//! Sparse matrix utilities.
//!
//! Helper functions for working with nalgebra-sparse matrices.

use nalgebra_sparse::{CooMatrix, CscMatrix};

/// Create a CSC matrix from triplets (row, col, value).
///
/// Duplicates are summed together.
pub fn csc_from_triplets(
    nrows: usize,
    ncols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<f64>,
) -> CscMatrix<f64> {
    if rows.is_empty() {
        return CscMatrix::zeros(nrows, ncols);
    }

    let mut coo = CooMatrix::new(nrows, ncols);
    for ((row, col), val) in rows.into_iter().zip(cols).zip(vals) {
        if row < nrows && col < ncols {
            coo.push(row, col, val);
        }
    }

    CscMatrix::from(&coo)
}

/// Create a single-column CSC matrix with one entry.
pub fn csc_unit(nrows: usize, row: usize, value: f64) -> CscMatrix<f64> {
    csc_from_triplets(nrows, 1, vec![row], vec![0], vec![value])
}

/// Stack CSC matrices vertically.
pub fn csc_vstack(blocks: &[&CscMatrix<f64>]) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();
    let mut offset = 0;
    let mut ncols = 0;

    for block in blocks {
        for (r, c, v) in block.triplet_iter() {
            rows.push(r + offset);
            cols.push(c);
            vals.push(*v);
        }
        offset += block.nrows();
        ncols = ncols.max(block.ncols());
    }

    csc_from_triplets(offset, ncols, rows, cols, vals)
}

/// Add two CSC matrices of the same shape.
pub fn csc_add(a: &CscMatrix<f64>, b: &CscMatrix<f64>) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for (r, c, v) in a.triplet_iter().chain(b.triplet_iter()) {
        rows.push(r);
        cols.push(c);
        vals.push(*v);
    }

    // COO -> CSC conversion sums the duplicates
    csc_from_triplets(a.nrows(), a.ncols(), rows, cols, vals)
}

/// Scale a CSC matrix.
pub fn csc_scale(a: &CscMatrix<f64>, scalar: f64) -> CscMatrix<f64> {
    csc_map_values(a, |v| v * scalar)
}

/// Divide every entry of a CSC matrix by `divisor`.
pub fn csc_div(a: &CscMatrix<f64>, divisor: f64) -> CscMatrix<f64> {
    csc_map_values(a, |v| v / divisor)
}

fn csc_map_values(a: &CscMatrix<f64>, f: impl Fn(f64) -> f64) -> CscMatrix<f64> {
    let values: Vec<f64> = a.values().iter().map(|v| f(*v)).collect();
    let col_offsets: Vec<usize> = a.col_offsets().to_vec();
    let row_indices: Vec<usize> = a.row_indices().to_vec();
    CscMatrix::try_from_csc_data(a.nrows(), a.ncols(), col_offsets, row_indices, values)
        .unwrap_or_else(|_| CscMatrix::zeros(a.nrows(), a.ncols()))
}

/// Extract rows `start..end` of a CSC matrix.
pub fn csc_rows(a: &CscMatrix<f64>, start: usize, end: usize) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for (r, c, v) in a.triplet_iter() {
        if r >= start && r < end {
            rows.push(r - start);
            cols.push(c);
            vals.push(*v);
        }
    }

    csc_from_triplets(end - start, a.ncols(), rows, cols, vals)
}

/// Sum all rows of a CSC matrix into a single row.
pub fn csc_sum_rows(a: &CscMatrix<f64>) -> CscMatrix<f64> {
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for (_r, c, v) in a.triplet_iter() {
        cols.push(c);
        vals.push(*v);
    }

    let rows = vec![0; cols.len()];
    csc_from_triplets(1, a.ncols(), rows, cols, vals)
}

/// Repeat the rows of a CSC matrix `times` times.
pub fn csc_repeat_rows(m: &CscMatrix<f64>, times: usize) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for (r, c, v) in m.triplet_iter() {
        for t in 0..times {
            rows.push(t * m.nrows() + r);
            cols.push(c);
            vals.push(*v);
        }
    }

    csc_from_triplets(m.nrows() * times, m.ncols(), rows, cols, vals)
}

/// Drop stored entries whose magnitude is at most `tol`.
pub fn csc_prune(a: &CscMatrix<f64>, tol: f64) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for (r, c, v) in a.triplet_iter() {
        if v.abs() > tol {
            rows.push(r);
            cols.push(c);
            vals.push(*v);
        }
    }

    csc_from_triplets(a.nrows(), a.ncols(), rows, cols, vals)
}

/// Largest absolute stored value, or zero for an empty matrix.
pub fn csc_max_abs(a: &CscMatrix<f64>) -> f64 {
    a.values().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csc_from_triplets() {
        let m = csc_from_triplets(3, 3, vec![0, 1, 2], vec![0, 1, 2], vec![1.0, 2.0, 3.0]);
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.ncols(), 3);
        assert_eq!(m.nnz(), 3);
    }

    #[test]
    fn test_csc_add_sums_duplicates() {
        let a = csc_unit(3, 1, 2.0);
        let b = csc_unit(3, 1, -0.5);
        let sum = csc_add(&a, &b);
        let entries: Vec<_> = sum.triplet_iter().map(|(r, c, v)| (r, c, *v)).collect();
        assert_eq!(entries, vec![(1, 0, 1.5)]);
    }

    #[test]
    fn test_csc_vstack_offsets_rows() {
        let a = csc_unit(2, 1, 1.0);
        let b = csc_unit(3, 0, 4.0);
        let s = csc_vstack(&[&a, &b]);
        assert_eq!(s.nrows(), 5);
        let entries: Vec<_> = s.triplet_iter().map(|(r, _, v)| (r, *v)).collect();
        assert_eq!(entries, vec![(1, 1.0), (2, 4.0)]);
    }

    #[test]
    fn test_csc_rows_and_sum() {
        let m = csc_from_triplets(4, 1, vec![0, 2, 3], vec![0, 0, 0], vec![1.0, 2.0, 3.0]);
        let tail = csc_rows(&m, 2, 4);
        assert_eq!(tail.nrows(), 2);
        assert_eq!(tail.nnz(), 2);

        let total = csc_sum_rows(&m);
        assert_eq!(total.nrows(), 1);
        let entries: Vec<_> = total.triplet_iter().map(|(_, _, v)| *v).collect();
        assert_eq!(entries, vec![6.0]);
    }

    #[test]
    fn test_csc_prune() {
        let m = csc_from_triplets(2, 1, vec![0, 1], vec![0, 0], vec![1e-14, 1.0]);
        let pruned = csc_prune(&m, 1e-12);
        assert_eq!(pruned.nnz(), 1);
        assert_eq!(csc_max_abs(&pruned), 1.0);
    }

    #[test]
    fn test_csc_div_is_exact() {
        let m = csc_from_triplets(98, 1, (0..98).collect(), vec![0; 98], vec![1.0; 98]);
        let total = csc_div(&csc_sum_rows(&m), 98.0);
        let entries: Vec<_> = total.triplet_iter().map(|(_, _, v)| *v).collect();
        assert_eq!(entries, vec![1.0]);
    }

    #[test]
    fn test_csc_repeat_rows() {
        let m = csc_unit(1, 0, 2.0);
        let r = csc_repeat_rows(&m, 3);
        assert_eq!(r.nrows(), 3);
        assert_eq!(r.nnz(), 3);
    }
}
