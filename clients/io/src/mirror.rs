//! Deformable mirror

use interface::UID;

/// Modal coefficients as fractions of each mode physical limit
#[derive(UID)]
pub enum ModalCoefficients {}
/// Modal coefficients in percent of each mode physical limit
#[derive(UID)]
pub enum ModalPercentages {}
/// Raw actuator commands, before the safety normalization
#[derive(UID)]
pub enum RawActuatorCommand {}
/// Normalized actuator commands in `[-1,1]`
#[derive(UID)]
pub enum ActuatorCommand {}

#[cfg(test)]
mod tests {
    use interface::{Data, UniqueIdentifier, UID};

    use super::*;

    fn is_command<U: UniqueIdentifier<DataType = Vec<f64>>>() {}

    #[derive(UID)]
    #[uid(data = Vec<usize>)]
    enum ActiveModes {}

    #[test]
    fn data_types() {
        is_command::<ModalCoefficients>();
        is_command::<ModalPercentages>();
        is_command::<RawActuatorCommand>();
        is_command::<ActuatorCommand>();
        let modes: Data<ActiveModes> = vec![1usize, 2, 3].into();
        assert_eq!(*modes, vec![1, 2, 3]);
        let percent: Data<ModalPercentages> = vec![50.].into();
        let coefficients: Data<ModalCoefficients> = (percent * 1e-2).transmute();
        assert_eq!(*coefficients, vec![0.5]);
    }
}
