use std::path::Path;

use nalgebra::DMatrix;

use crate::{table, transform, ModalError, Result};

/// Deformable mirror Zernike-to-command (Z2C) calibration
///
/// The matrix has as many rows as modes and as many columns as actuators.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationMatrix {
    z2c: DMatrix<f64>,
    serial: Option<String>,
}

impl CalibrationMatrix {
    /// Creates the calibration matrix from its rows, one row per mode
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::try_from_rows(rows, "calibration rows")
    }
    fn try_from_rows(rows: Vec<Vec<f64>>, origin: &str) -> Result<Self> {
        let parse_error = |line: usize, reason: String| ModalError::ConfigParse {
            origin: origin.to_string(),
            line: line as u64,
            reason,
        };
        let n_actuator = rows
            .first()
            .map(|row| row.len())
            .filter(|&n| n > 0)
            .ok_or_else(|| parse_error(0, "empty calibration".into()))?;
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_actuator)
        {
            return Err(parse_error(
                i + 1,
                format!(
                    "mode #{} has {} actuators, expected {n_actuator}",
                    i + 1,
                    row.len()
                ),
            ));
        }
        let n_mode = rows.len();
        Ok(Self {
            z2c: DMatrix::from_row_iterator(n_mode, n_actuator, rows.into_iter().flatten()),
            serial: None,
        })
    }
    /// Loads the calibration matrix from a comma separated file
    ///
    /// Each line of the file is a mode and each mode is the list of the actuator weights
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        log::info!("loading Z2C calibration from {origin}");
        let mut reader = table::open(path)?;
        let mut rows = vec![];
        for (line, record) in table::records(&mut reader, &origin)? {
            let row = table::parse_record(&record, &origin, line)?;
            rows.push(row);
        }
        let this = Self::try_from_rows(rows, &origin)?;
        log::debug!(
            "Z2C calibration: {} modes x {} actuators",
            this.n_mode(),
            this.n_actuator()
        );
        Ok(this)
    }
    /// Loads the calibration matrix of the mirror `serial` from the `config_dir` directory
    ///
    /// The calibration file name is `<serial>-Z2C.csv`
    pub fn load(config_dir: impl AsRef<Path>, serial: &str) -> Result<Self> {
        let path = config_dir.as_ref().join(Self::file_name(serial));
        Ok(Self {
            serial: Some(serial.to_string()),
            ..Self::from_path(path)?
        })
    }
    /// Returns the calibration file name of the mirror `serial`
    pub fn file_name(serial: &str) -> String {
        format!("{serial}-Z2C.csv")
    }
    /// Returns the mirror serial number, if loaded from a device calibration file
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }
    /// Returns the number of calibrated modes
    pub fn n_mode(&self) -> usize {
        self.z2c.nrows()
    }
    /// Returns the number of actuators
    pub fn n_actuator(&self) -> usize {
        self.z2c.ncols()
    }
    /// Returns a reference to the Z2C matrix
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.z2c
    }
    /// Transforms the modal `coefficients` into raw actuator commands
    ///
    /// Only the first `coefficients.len()` modes contribute to the commands
    pub fn transform(&self, coefficients: &[f64]) -> Result<Vec<f64>> {
        transform(coefficients, &self.z2c)
    }
}
