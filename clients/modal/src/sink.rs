use crate::{ModalError, Result};

/// Name of the attribute holding the number of actuators of a mirror
pub const N_ACTUATOR_ATTRIBUTE: &str = "NBOfActuator";

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("mirror is not connected")]
    Disconnected,
    #[error("unknown mirror attribute: {0}")]
    UnknownAttribute(String),
    #[error("mirror rejected the command: {0}")]
    Rejected(String),
}

/// Deformable mirror device interface
///
/// A sink receives complete actuator command vectors, one at a time.
pub trait ActuatorSink {
    /// Returns the value of a device attribute
    fn get(&mut self, attribute: &str) -> std::result::Result<f64, SinkError>;
    /// Commands all the actuators at once
    fn send(&mut self, command: &[f64]) -> std::result::Result<(), SinkError>;
    /// Returns all the actuators to their neutral position
    fn reset(&mut self) -> std::result::Result<(), SinkError>;

    /// Returns the number of actuators of the device
    fn n_actuator(&mut self) -> Result<usize> {
        let value = self.get(N_ACTUATOR_ATTRIBUTE)?;
        if value.is_finite() && value >= 1. && value.fract() == 0. {
            Ok(value as usize)
        } else {
            Err(SinkError::Rejected(format!("invalid number of actuators: {value}")).into())
        }
    }
}

impl<S: ActuatorSink + ?Sized> ActuatorSink for &mut S {
    fn get(&mut self, attribute: &str) -> std::result::Result<f64, SinkError> {
        (**self).get(attribute)
    }
    fn send(&mut self, command: &[f64]) -> std::result::Result<(), SinkError> {
        (**self).send(command)
    }
    fn reset(&mut self) -> std::result::Result<(), SinkError> {
        (**self).reset()
    }
}

/// Sends a command after checking its length against the number of actuators
pub(crate) fn dispatch<S: ActuatorSink + ?Sized>(
    sink: &mut S,
    command: &[f64],
    n_actuator: usize,
) -> Result<()> {
    if command.len() != n_actuator {
        return Err(ModalError::DimensionMismatch {
            context: "actuator command vs mirror actuators",
            expected: n_actuator,
            found: command.len(),
        });
    }
    sink.send(command)?;
    Ok(())
}
