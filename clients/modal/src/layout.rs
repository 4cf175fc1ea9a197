use crate::{ModalError, Result};

/// Actuators geometry of a deformable mirror
///
/// The actuators are arranged on a square grid, row after row from the top,
/// each row centered on the mirror vertical axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorLayout {
    rows: Vec<usize>,
    pitch: f64,
}

impl ActuatorLayout {
    /// Creates a layout from the number of actuators in each row and the actuator pitch
    pub fn new(rows: Vec<usize>, pitch: f64) -> Self {
        Self { rows, pitch }
    }
    /// 97 actuators mirror layout
    pub fn dm97() -> Self {
        Self::new(vec![5, 7, 9, 11, 11, 11, 11, 11, 9, 7, 5], 1.2)
    }
    /// Returns the total number of actuators
    pub fn n_actuator(&self) -> usize {
        self.rows.iter().sum()
    }
    /// Returns the `(x,y)` coordinates of the actuators
    ///
    /// The origin is at the center of the bottom row
    pub fn positions(&self) -> Vec<(f64, f64)> {
        let n_row = self.rows.len();
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, &n)| {
                let y = (n_row - row - 1) as f64 * self.pitch;
                (0..n).map(move |i| ((i as f64 - n as f64 / 2. + 0.5) * self.pitch, y))
            })
            .collect()
    }
    /// Splits an actuator command into the layout rows
    pub fn split<'a>(&self, command: &'a [f64]) -> Result<Vec<&'a [f64]>> {
        if command.len() != self.n_actuator() {
            return Err(ModalError::DimensionMismatch {
                context: "actuator command vs actuator layout",
                expected: self.n_actuator(),
                found: command.len(),
            });
        }
        let mut rest = command;
        Ok(self
            .rows
            .iter()
            .map(|&n| {
                let (row, tail) = rest.split_at(n);
                rest = tail;
                row
            })
            .collect())
    }
    /// Returns the number of actuators in the widest row
    pub fn width(&self) -> usize {
        self.rows.iter().copied().max().unwrap_or_default()
    }
}
