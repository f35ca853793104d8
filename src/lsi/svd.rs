//! Linear-algebra collaborator.
//!
//! The engine never implements its own eigen-decomposition; it hands a dense
//! matrix to nalgebra and consumes the factors as given. Non-convergence is
//! fatal and propagated.

use nalgebra::{DMatrix, DVector};

use crate::error::Error;

#[derive(Debug)]
pub(crate) struct Decomposition {
    /// Left singular vectors, docs x rank.
    pub u: DMatrix<f64>,
    /// Singular values, descending.
    pub singular: DVector<f64>,
    /// Right singular vectors transposed, rank x terms.
    pub v_t: DMatrix<f64>,
}

/// Full singular value decomposition of `matrix`, factors ordered by
/// descending singular value. Supports more columns than rows and vice versa.
pub(crate) fn decompose(matrix: DMatrix<f64>) -> Result<Decomposition, Error> {
    let mut svd =
        nalgebra::SVD::try_new(matrix, true, true, f64::EPSILON, 0).ok_or(Error::Decomposition)?;
    svd.sort_by_singular_values();
    let u = svd.u.ok_or(Error::Decomposition)?;
    let v_t = svd.v_t.ok_or(Error::Decomposition)?;
    Ok(Decomposition {
        u,
        singular: svd.singular_values,
        v_t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstructs_a_wide_matrix() {
        // more columns (terms) than rows (documents)
        let m = DMatrix::from_row_slice(2, 4, &[1.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 1.0]);
        let dec = decompose(m.clone()).unwrap();
        let rebuilt =
            &dec.u * DMatrix::from_diagonal(&dec.singular) * &dec.v_t;
        for i in 0..2 {
            for j in 0..4 {
                assert!((rebuilt[(i, j)] - m[(i, j)]).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn singular_values_are_descending() {
        let m = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 5.0, 2.0, 0.0]);
        let dec = decompose(m).unwrap();
        for pair in dec.singular.as_slice().windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }
}
