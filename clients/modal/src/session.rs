use dm_clients_io::mirror::{
    ActuatorCommand, ModalCoefficients, ModalPercentages, RawActuatorCommand,
};
use flume::{Receiver, Sender};
use interface::{print_info, trim_type_name, Data, Read, Size, Update, Write};

use crate::{
    normalize, sink, ActuatorSink, CalibrationMatrix, ModalError, ModeCatalog, Result, CAPACITY,
};

/// Default number of active modes
pub const DEFAULT_N_MODE: usize = 8;

/// Interactive modal command session
///
/// The session holds the coefficients of the active modes as fractions of each mode
/// physical limit.
/// The actuator command is recomputed from the coefficients on every request,
/// and every coefficients change is broadcasted to the [subscribers](Session::subscribe).
///
/// As a client, the session reads [ModalCoefficients] or [ModalPercentages],
/// notifies the subscribers on [Update::update] and writes the [ActuatorCommand]
/// and the [RawActuatorCommand].
pub struct Session {
    catalog: ModeCatalog,
    z2c: CalibrationMatrix,
    n_actuator: usize,
    coefficients: Vec<f64>,
    subscribers: Vec<Sender<Data<ActuatorCommand>>>,
}

impl Session {
    /// Creates a new session for a mirror with `n_actuator` actuators
    ///
    /// All the coefficients of the first [DEFAULT_N_MODE] modes (or less if the calibration
    /// has less modes) are set to zero.
    pub fn new(z2c: CalibrationMatrix, n_actuator: usize) -> Self {
        let n_mode = DEFAULT_N_MODE.min(z2c.n_mode()).max(1);
        log::info!(
            "new modal session: {n_mode} modes, {n_actuator} actuators, serial {}",
            z2c.serial().unwrap_or("n/a")
        );
        Self {
            catalog: ModeCatalog::noll(),
            z2c,
            n_actuator,
            coefficients: vec![0f64; n_mode],
            subscribers: vec![],
        }
    }
    /// Sets the number of active modes
    pub fn n_mode(mut self, n_mode: usize) -> Result<Self> {
        self.set_mode_count(n_mode)?;
        Ok(self)
    }
    /// Returns the mode names catalog
    pub fn catalog(&self) -> &ModeCatalog {
        &self.catalog
    }
    /// Returns the calibration matrix
    pub fn calibration(&self) -> &CalibrationMatrix {
        &self.z2c
    }
    /// Returns the number of actuators
    pub fn n_actuator(&self) -> usize {
        self.n_actuator
    }
    /// Returns the number of active modes
    pub fn mode_count(&self) -> usize {
        self.coefficients.len()
    }
    /// Returns the coefficients of the active modes
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
    /// Iterates over the names and the coefficients of the active modes
    pub fn modes(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.catalog
            .iter()
            .map(|name| name.as_str())
            .zip(self.coefficients.iter().copied())
    }
    /// Returns a receiver of the actuator commands computed after each coefficients change
    pub fn subscribe(&mut self) -> Receiver<Data<ActuatorCommand>> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn check_mode_count(n_mode: usize) -> Result<()> {
        if (1..=CAPACITY).contains(&n_mode) {
            Ok(())
        } else {
            Err(ModalError::InvalidModeCount(n_mode))
        }
    }
    /// Changes the number of active modes
    ///
    /// The coefficients of the modes that remain active are preserved
    /// and the coefficients of the new modes are set to zero
    pub fn set_mode_count(&mut self, n_mode: usize) -> Result<&mut Self> {
        Self::check_mode_count(n_mode)?;
        log::debug!("{} -> {n_mode} modes", self.coefficients.len());
        self.coefficients.resize(n_mode, 0f64);
        self.notify();
        Ok(self)
    }
    /// Sets the coefficient of the mode at `index`
    pub fn set_coefficient(&mut self, index: usize, value: f64) -> Result<&mut Self> {
        let n_mode = self.coefficients.len();
        let coefficient = self
            .coefficients
            .get_mut(index)
            .ok_or(ModalError::IndexOutOfRange { index, n_mode })?;
        *coefficient = value;
        self.notify();
        Ok(self)
    }
    /// Sets the coefficient of the mode at `index` from a percentage of the mode limit
    pub fn set_percent(&mut self, index: usize, percent: f64) -> Result<&mut Self> {
        self.set_coefficient(index, percent * 1e-2)
    }
    /// Replaces all the coefficients, the number of active modes becomes the number of coefficients
    pub fn set_coefficients(&mut self, coefficients: Vec<f64>) -> Result<&mut Self> {
        Self::check_mode_count(coefficients.len())?;
        self.coefficients = coefficients;
        self.notify();
        Ok(self)
    }
    /// Sets all the coefficients to zero
    pub fn reset(&mut self) -> &mut Self {
        self.coefficients.iter_mut().for_each(|c| *c = 0f64);
        self.notify();
        self
    }
    /// Returns the actuator command before normalization
    pub fn raw_command(&self) -> Result<Vec<f64>> {
        self.z2c.transform(&self.coefficients)
    }
    /// Returns the normalized actuator command
    pub fn current_command(&self) -> Result<Vec<f64>> {
        normalize(&self.raw_command()?)
    }
    /// Sends the current actuator command to the mirror
    ///
    /// Nothing is sent if the command cannot be computed
    pub fn dispatch<S: ActuatorSink + ?Sized>(&self, sink: &mut S) -> Result<Vec<f64>> {
        let command = self.current_command()?;
        sink::dispatch(sink, &command, self.n_actuator)?;
        log::info!("modal command sent to the mirror ({} modes)", self.mode_count());
        Ok(command)
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        match self.current_command() {
            Ok(command) => {
                let data = Data::<ActuatorCommand>::new(command);
                self.subscribers.retain(|tx| tx.send(data.clone()).is_ok());
            }
            Err(e) => print_info("actuator command update failed", Some(&e)),
        }
    }
    fn read_coefficients(&mut self, coefficients: Vec<f64>) {
        if let Err(e) = Self::check_mode_count(coefficients.len()) {
            let msg = format!("{} discarded", trim_type_name::<ModalCoefficients>());
            print_info(msg, Some(&e));
            return;
        }
        self.coefficients = coefficients;
    }
}

impl Update for Session {
    fn update(&mut self) {
        self.notify();
    }
}

impl Read<ModalCoefficients> for Session {
    fn read(&mut self, data: Data<ModalCoefficients>) {
        self.read_coefficients(data.into());
    }
}

impl Read<ModalPercentages> for Session {
    fn read(&mut self, data: Data<ModalPercentages>) {
        let data: Data<ModalCoefficients> = (data * 1e-2).transmute();
        self.read_coefficients(data.into());
    }
}

impl Write<RawActuatorCommand> for Session {
    fn write(&mut self) -> Option<Data<RawActuatorCommand>> {
        self.raw_command()
            .map_err(|e| {
                let msg = format!("{} unavailable", trim_type_name::<RawActuatorCommand>());
                print_info(msg, Some(&e))
            })
            .ok()
            .map(Data::new)
    }
}

impl Write<ActuatorCommand> for Session {
    fn write(&mut self) -> Option<Data<ActuatorCommand>> {
        self.current_command()
            .map_err(|e| {
                let msg = format!("{} unavailable", trim_type_name::<ActuatorCommand>());
                print_info(msg, Some(&e))
            })
            .ok()
            .map(Data::new)
    }
}

impl Size<ActuatorCommand> for Session {
    fn len(&self) -> usize {
        self.n_actuator
    }
}

impl Size<ModalCoefficients> for Session {
    fn len(&self) -> usize {
        self.coefficients.len()
    }
}
