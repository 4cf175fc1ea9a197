//! # Deformable Mirror Modal Command Engine
//!
//! Converts Zernike modal coefficients into deformable mirror actuator commands.
//!
//! The engine is made of:
//!  1. the [ModeCatalog], the Noll ordered list of mode names,
//!  2. the [CalibrationMatrix], the device Zernike-to-command (Z2C) transform,
//!  3. the modal [transform] from coefficients to raw actuator commands,
//!  4. the safety [normalize]r that brings any raw command within `[-1,1]`,
//!  5. the interactive [Session] and the sequence [Player], both dispatching
//!     commands to an [ActuatorSink].
//!
//! ```
//! use dm_clients_modal::{normalize, CalibrationMatrix};
//!
//! let z2c = CalibrationMatrix::from_rows(vec![vec![1., 0., -1.], vec![0., 1., 1.]])?;
//! let raw = z2c.transform(&[0.5, 0.5])?;
//! assert_eq!(normalize(&raw)?, vec![0.5, 0.5, 0.]);
//! # Ok::<(), dm_clients_modal::ModalError>(())
//! ```

use std::path::PathBuf;

mod catalog;
pub use catalog::{ModeCatalog, CAPACITY};
mod calibration;
pub use calibration::CalibrationMatrix;
mod transform;
pub use transform::transform;
mod normalize;
pub use normalize::normalize;
mod sink;
pub use sink::{ActuatorSink, SinkError, N_ACTUATOR_ATTRIBUTE};
mod session;
pub use session::{Session, DEFAULT_N_MODE};
mod sequence;
pub use sequence::{ModeRange, PlaybackSequence};
mod progress;
pub use progress::PlaybackReport;
mod player;
pub use player::{AbortReason, Canceller, Player, PlayerState, DEFAULT_INTERVAL};
mod layout;
pub use layout::ActuatorLayout;
mod table;

#[derive(Debug, thiserror::Error)]
pub enum ModalError {
    #[error("configuration file {0:?} not found")]
    ConfigNotFound(PathBuf),
    #[error("failed to parse {origin} (line {line}): {reason}")]
    ConfigParse {
        origin: String,
        line: u64,
        reason: String,
    },
    #[error("{context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("mode index {index} is out of range (active modes: {n_mode})")]
    IndexOutOfRange { index: usize, n_mode: usize },
    #[error("the number of modes must be in [1,{CAPACITY}], found {0}")]
    InvalidModeCount(usize),
    #[error("actuator command has non-finite values")]
    NonFiniteCommand,
    #[error("actuator sink unavailable")]
    SinkUnavailable(#[from] SinkError),
    #[error("the sequence player must be idle to start, found {0:?}")]
    NotIdle(PlayerState),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
pub type Result<T> = std::result::Result<T, ModalError>;
