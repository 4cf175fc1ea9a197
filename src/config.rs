use std::{fs, path::Path, path::PathBuf, time::Duration};

use dm_clients_modal::{CalibrationMatrix, DEFAULT_INTERVAL, DEFAULT_N_MODE};
use serde::{Deserialize, Serialize};

use crate::{DmControlError, Result};

/// Mirror control configuration
///
/// ```toml
/// config_dir = "./config"
/// serial = "BAX123"
/// n_mode = 8
/// n_actuator = 97
/// interval = 5.0
/// max_steps = 5
/// progress = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmConfig {
    /// Directory of the `<serial>-Z2C.csv` calibration files
    pub config_dir: PathBuf,
    /// Mirror serial number, prompted for if missing
    pub serial: Option<String>,
    /// Number of modes active when the console starts
    pub n_mode: usize,
    /// Number of actuators of the simulated mirror
    pub n_actuator: usize,
    /// Time interval between 2 playback steps `[s]`
    pub interval: f64,
    /// Maximum number of playback steps
    pub max_steps: Option<usize>,
    /// Playback progress bar
    pub progress: bool,
}

impl Default for DmConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("./config"),
            serial: None,
            n_mode: DEFAULT_N_MODE,
            n_actuator: 97,
            interval: DEFAULT_INTERVAL.as_secs_f64(),
            max_steps: None,
            progress: true,
        }
    }
}

impl DmConfig {
    /// Loads the configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("loading configuration from {}", path.display());
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        config.interval()?;
        Ok(config)
    }
    /// Returns the time interval between 2 playback steps
    pub fn interval(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.interval)
            .ok()
            .filter(|interval| !interval.is_zero())
            .ok_or(DmControlError::Interval(self.interval))
    }
    /// Loads the calibration matrix of the mirror `serial`
    pub fn calibration(&self, serial: &str) -> Result<CalibrationMatrix> {
        Ok(CalibrationMatrix::load(&self.config_dir, serial)?)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn partial() -> std::result::Result<(), Box<dyn Error>> {
        let config: DmConfig = toml::from_str("serial = \"BAX123\"\ninterval = 0.5")?;
        assert_eq!(config.serial.as_deref(), Some("BAX123"));
        assert_eq!(config.interval()?, Duration::from_millis(500));
        assert_eq!(config.n_mode, DEFAULT_N_MODE);
        assert_eq!(config.config_dir, PathBuf::from("./config"));
        Ok(())
    }

    #[test]
    fn negative_interval() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dm.toml");
        fs::write(&path, "interval = -1.0")?;
        assert!(matches!(
            DmConfig::load(&path),
            Err(DmControlError::Interval(_))
        ));
        Ok(())
    }

    #[test]
    fn zero_interval() -> std::result::Result<(), Box<dyn Error>> {
        let config: DmConfig = toml::from_str("interval = 0.0")?;
        assert!(matches!(
            config.interval(),
            Err(DmControlError::Interval(x)) if x == 0.
        ));
        Ok(())
    }
}
