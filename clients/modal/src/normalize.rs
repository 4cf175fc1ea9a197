use crate::{ModalError, Result};

/// Actuator command safety normalization
///
/// Commands already within `[-1,1]` are returned unchanged.
/// Otherwise the whole vector is rescaled: mapped onto `[0,1]` with its own
/// minimum and maximum and then onto `[-1,1]`.
/// The ordering of the actuators is preserved but not their relative spacing.
/// A vector with all its values equal (and out of range) is mapped to zeros.
///
/// Non-finite values are rejected with [ModalError::NonFiniteCommand].
pub fn normalize(raw: &[f64]) -> Result<Vec<f64>> {
    if raw.iter().any(|x| !x.is_finite()) {
        return Err(ModalError::NonFiniteCommand);
    }
    let (min, max) = raw
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &x| {
            (min.min(x), max.max(x))
        });
    if raw.is_empty() || (min >= -1. && max <= 1.) {
        return Ok(raw.to_vec());
    }
    // halved bounds keep `max - min` finite over the whole f64 range
    let (lo, hi) = (min * 0.5, max * 0.5);
    let range = hi - lo;
    if range == 0. {
        log::warn!("degenerate actuator command (all values at {min}), sending zeros");
        return Ok(vec![0f64; raw.len()]);
    }
    log::debug!("rescaling actuator command from [{min:.3},{max:.3}] to [-1,1]");
    Ok(raw
        .iter()
        .map(|x| ((x * 0.5 - lo) / range).clamp(0., 1.))
        .map(|y| 2. * y - 1.)
        .collect())
}
