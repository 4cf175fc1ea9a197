//! Simulated deformable mirror

use std::fmt::Display;

use dm_clients_modal::{ActuatorSink, SinkError, N_ACTUATOR_ATTRIBUTE};
use nalgebra::DVector;

/// Actuator command statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub std: f64,
}
impl Statistics {
    pub fn new(command: &[f64]) -> Self {
        let command = DVector::from_column_slice(command);
        Self {
            max: command.max(),
            min: command.min(),
            mean: command.mean(),
            std: command.variance().sqrt(),
        }
    }
}
impl Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "max={:+.4} min={:+.4} mean={:+.4} std={:.4}",
            self.max, self.min, self.mean, self.std
        )
    }
}

/// Deformable mirror stand-in
///
/// Holds the last command it received and rejects any command that a real
/// mirror would not accept: wrong number of actuators or values outside `[-1,1]`.
#[derive(Debug, Clone)]
pub struct SimulatedMirror {
    serial: String,
    command: Vec<f64>,
    connected: bool,
    n_send: usize,
}

impl SimulatedMirror {
    /// Connects to the mirror `serial` with `n_actuator` actuators
    pub fn connect(serial: impl Into<String>, n_actuator: usize) -> Self {
        let serial = serial.into();
        log::info!("connected to mirror {serial} ({n_actuator} actuators)");
        Self {
            serial,
            command: vec![0f64; n_actuator],
            connected: true,
            n_send: 0,
        }
    }
    /// Disconnects the mirror
    pub fn disconnect(&mut self) {
        log::info!("mirror {} disconnected", self.serial);
        self.connected = false;
    }
    /// Returns the mirror serial number
    pub fn serial(&self) -> &str {
        &self.serial
    }
    /// Returns the last command applied to the actuators
    pub fn command(&self) -> &[f64] {
        &self.command
    }
    /// Returns the number of commands received
    pub fn n_send(&self) -> usize {
        self.n_send
    }
    fn check_connection(&self) -> Result<(), SinkError> {
        if self.connected {
            Ok(())
        } else {
            Err(SinkError::Disconnected)
        }
    }
}

impl ActuatorSink for SimulatedMirror {
    fn get(&mut self, attribute: &str) -> Result<f64, SinkError> {
        self.check_connection()?;
        match attribute {
            N_ACTUATOR_ATTRIBUTE => Ok(self.command.len() as f64),
            _ => Err(SinkError::UnknownAttribute(attribute.to_string())),
        }
    }

    fn send(&mut self, command: &[f64]) -> Result<(), SinkError> {
        self.check_connection()?;
        if command.len() != self.command.len() {
            return Err(SinkError::Rejected(format!(
                "expected {} actuators, found {}",
                self.command.len(),
                command.len()
            )));
        }
        if let Some(x) = command.iter().find(|x| !(-1f64..=1.).contains(*x)) {
            return Err(SinkError::Rejected(format!("{x} is outside [-1,1]")));
        }
        log::debug!("mirror {}: {}", self.serial, Statistics::new(command));
        self.command.copy_from_slice(command);
        self.n_send += 1;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SinkError> {
        self.check_connection()?;
        log::info!("mirror {} reset", self.serial);
        self.command.iter_mut().for_each(|x| *x = 0f64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_actuator() {
        let mut dm = SimulatedMirror::connect("BAX123", 97);
        assert_eq!(dm.n_actuator().unwrap(), 97);
        assert!(matches!(
            dm.get("Temperature"),
            Err(SinkError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn send_and_reset() {
        let mut dm = SimulatedMirror::connect("BAX123", 3);
        dm.send(&[0.5, -1., 1.]).unwrap();
        assert_eq!(dm.command(), [0.5, -1., 1.]);
        assert!(dm.send(&[0.5, 1.5, 0.]).is_err());
        assert!(dm.send(&[0.5]).is_err());
        assert_eq!(dm.n_send(), 1);
        dm.reset().unwrap();
        assert_eq!(dm.command(), [0.; 3]);
    }

    #[test]
    fn statistics() {
        let stats = Statistics::new(&[1., -1., 0., 0.]);
        assert_eq!(stats.max, 1.);
        assert_eq!(stats.min, -1.);
        assert_eq!(stats.mean, 0.);
        assert!((stats.std - 0.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn disconnected() {
        let mut dm = SimulatedMirror::connect("BAX123", 3);
        dm.disconnect();
        assert!(matches!(dm.send(&[0.; 3]), Err(SinkError::Disconnected)));
        assert!(matches!(dm.reset(), Err(SinkError::Disconnected)));
    }
}
