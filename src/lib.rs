//! # Deformable Mirror Control
//!
//! Command line front-end of the [modal command engine](dm_clients_modal).
//!
//! The application connects to a deformable mirror, reads its number of actuators,
//! zeroes all the actuators and then either:
//!  1. runs the interactive [console] where modes are added, removed and set one at a time,
//!  2. or plays a table of modal coefficients with the [playback] runner.
//!
//! The settings are read from a TOML [configuration](DmConfig) file
//! and may be overridden from the command line.

mod config;
pub use config::DmConfig;
mod mirror;
pub use mirror::{SimulatedMirror, Statistics};
pub mod console;
pub mod playback;

#[derive(Debug, thiserror::Error)]
pub enum DmControlError {
    #[error("input/output failed")]
    Io(#[from] std::io::Error),
    #[error("failed to parse the configuration")]
    Toml(#[from] toml::de::Error),
    #[error("modal command engine failed")]
    Modal(#[from] dm_clients_modal::ModalError),
    #[error("the playback interval must be a positive number of seconds, found {0}")]
    Interval(f64),
}
pub type Result<T> = std::result::Result<T, DmControlError>;
