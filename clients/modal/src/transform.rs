use nalgebra::{DMatrix, DVector};

use crate::{ModalError, Result};

/// Modal to actuator transform
///
/// Computes `z2c[..n,..]ᵀ · coefficients` with `n` the number of coefficients:
/// each actuator command is the sum over the active modes of the mode actuator weight
/// times the mode coefficient.
/// The number of commands is the number of `z2c` columns whatever the number of modes.
pub fn transform(coefficients: &[f64], z2c: &DMatrix<f64>) -> Result<Vec<f64>> {
    let n_mode = coefficients.len();
    if n_mode > z2c.nrows() {
        return Err(ModalError::DimensionMismatch {
            context: "modal coefficients vs calibrated modes",
            expected: z2c.nrows(),
            found: n_mode,
        });
    }
    let c = DVector::from_column_slice(coefficients);
    let raw = z2c.rows(0, n_mode).tr_mul(&c);
    Ok(raw.as_slice().to_vec())
}
