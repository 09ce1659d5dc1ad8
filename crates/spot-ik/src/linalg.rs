//! General square-matrix algebra used by the body kinematics.
//!
//! Determinant and adjugate use recursive cofactor expansion, so the inverse
//! works for any `n x n` input (the kinematics only ever feeds 4x4 transforms).
//! Shape and singularity problems are returned as [`KinematicsError`]s rather
//! than silently truncated or masked.

use nalgebra::{DMatrix, DVector};

use spot_core::error::KinematicsError;

/// Determinants with magnitude below this are treated as singular.
pub const SINGULAR_EPSILON: f64 = 1e-12;

fn ensure_square(matrix: &DMatrix<f64>) -> Result<usize, KinematicsError> {
    let (rows, cols) = matrix.shape();
    if rows == cols && rows > 0 {
        Ok(rows)
    } else {
        Err(KinematicsError::NotSquare { rows, cols })
    }
}

/// Copy of `matrix` with row `skip_row` and column `skip_col` removed.
fn minor(matrix: &DMatrix<f64>, skip_row: usize, skip_col: usize) -> DMatrix<f64> {
    matrix.clone().remove_row(skip_row).remove_column(skip_col)
}

const fn cofactor_sign(i: usize, j: usize) -> f64 {
    if (i + j) % 2 == 0 { 1.0 } else { -1.0 }
}

fn determinant_unchecked(matrix: &DMatrix<f64>) -> f64 {
    match matrix.nrows() {
        1 => matrix[(0, 0)],
        2 => matrix[(0, 0)] * matrix[(1, 1)] - matrix[(0, 1)] * matrix[(1, 0)],
        n => (0..n)
            .map(|i| cofactor_sign(0, i) * matrix[(0, i)] * determinant_unchecked(&minor(matrix, 0, i)))
            .sum(),
    }
}

/// Determinant by cofactor expansion along row 0.
pub fn determinant(matrix: &DMatrix<f64>) -> Result<f64, KinematicsError> {
    ensure_square(matrix)?;
    Ok(determinant_unchecked(matrix))
}

/// Transposed matrix of signed cofactors.
pub fn adjugate(matrix: &DMatrix<f64>) -> Result<DMatrix<f64>, KinematicsError> {
    let n = ensure_square(matrix)?;
    if n == 1 {
        return Ok(DMatrix::from_element(1, 1, 1.0));
    }
    let cofactors = DMatrix::from_fn(n, n, |i, j| {
        cofactor_sign(i, j) * determinant_unchecked(&minor(matrix, i, j))
    });
    Ok(transpose(&cofactors))
}

/// `adjugate(M) / determinant(M)`.
///
/// # Errors
///
/// [`KinematicsError::SingularMatrix`] when `|det| < SINGULAR_EPSILON`; a
/// singular body transform means the pose itself is malformed.
pub fn inverse(matrix: &DMatrix<f64>) -> Result<DMatrix<f64>, KinematicsError> {
    let det = determinant(matrix)?;
    if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
        return Err(KinematicsError::SingularMatrix { determinant: det });
    }
    Ok(adjugate(matrix)? * (1.0 / det))
}

/// Matrix product `a * b`.
pub fn multiply(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>, KinematicsError> {
    if a.ncols() != b.nrows() {
        return Err(KinematicsError::DimensionMismatch {
            left: a.ncols(),
            right: b.nrows(),
        });
    }
    Ok(DMatrix::from_fn(a.nrows(), b.ncols(), |i, j| {
        (0..a.ncols()).map(|k| a[(i, k)] * b[(k, j)]).sum()
    }))
}

/// Matrix-vector product `m * v`.
pub fn multiply_vector(
    matrix: &DMatrix<f64>,
    vector: &DVector<f64>,
) -> Result<DVector<f64>, KinematicsError> {
    if matrix.ncols() != vector.len() {
        return Err(KinematicsError::DimensionMismatch {
            left: matrix.ncols(),
            right: vector.len(),
        });
    }
    Ok(DVector::from_fn(matrix.nrows(), |i, _| {
        (0..matrix.ncols()).map(|j| matrix[(i, j)] * vector[j]).sum()
    }))
}

pub fn transpose(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(matrix.ncols(), matrix.nrows(), |i, j| matrix[(j, i)])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
