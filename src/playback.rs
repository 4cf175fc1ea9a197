//! Modal sequence playback runner

use std::{io::BufRead, path::Path, thread};

use dm_clients_modal::{
    ActuatorSink, CalibrationMatrix, Canceller, PlaybackSequence, Player, PlayerState,
};

use crate::{DmConfig, Result};

/// Stops the playback as soon as a line is read from `input`
///
/// The watcher thread ends after the first line or at the end of the input.
pub fn watch<R>(input: R, canceller: Canceller) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        if let Some(Ok(_)) = input.lines().next() {
            canceller.cancel();
        }
    })
}

/// Sequence playback
pub struct Playback {
    player: Player,
}

impl Playback {
    /// Loads the table of modal coefficients and sets up the player from the configuration
    pub fn new(
        config: &DmConfig,
        table: impl AsRef<Path>,
        z2c: CalibrationMatrix,
        n_actuator: usize,
    ) -> Result<Self> {
        let sequence = PlaybackSequence::from_path(table)?;
        log::info!(
            "{} steps of {} modes ({})",
            sequence.len(),
            sequence.n_mode(),
            sequence.headers().join(", ")
        );
        let mut player: Player =
            Player::new(sequence, z2c, n_actuator).interval(config.interval()?);
        if let Some(max_steps) = config.max_steps {
            player = player.max_steps(max_steps);
        }
        if config.progress {
            player = player.progress();
        }
        Ok(Self { player })
    }
    /// Returns a handle to stop the playback
    pub fn canceller(&self) -> Canceller {
        self.player.canceller()
    }
    /// Returns the number of steps that will be played
    pub fn n_step(&self) -> usize {
        self.player.n_step()
    }
    /// Plays the sequence on the mirror
    pub fn run<S: ActuatorSink + ?Sized>(&mut self, sink: &mut S) -> Result<PlayerState> {
        Ok(self.player.run(sink)?)
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, fs, io::Cursor};

    use dm_clients_modal::AbortReason;

    use super::*;
    use crate::SimulatedMirror;

    fn setup(dir: &Path) -> std::result::Result<(DmConfig, CalibrationMatrix), Box<dyn Error>> {
        fs::write(dir.join("BAX200-Z2C.csv"), "1,0,-1\n0,1,1\n")?;
        fs::write(
            dir.join("ZernikeMags.csv"),
            "Tilt Y,Tilt X\n\"[-10,10]\",\"[-10,10]\"\n5,0\n0,5\n5,5\n",
        )?;
        let config = DmConfig {
            config_dir: dir.to_path_buf(),
            interval: 0.01,
            progress: false,
            ..Default::default()
        };
        let z2c = config.calibration("BAX200")?;
        Ok((config, z2c))
    }

    #[test]
    fn completed() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let (mut config, z2c) = setup(dir.path())?;
        config.max_steps = Some(2);
        let mut playback = Playback::new(&config, dir.path().join("ZernikeMags.csv"), z2c, 3)?;
        assert_eq!(playback.n_step(), 2);
        let mut dm = SimulatedMirror::connect("BAX200", 3);
        assert_eq!(playback.run(&mut dm)?, PlayerState::Completed);
        assert_eq!(dm.n_send(), 3);
        assert_eq!(dm.command(), [0.; 3]);
        Ok(())
    }

    #[test]
    fn missing_table() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let (config, z2c) = setup(dir.path())?;
        assert!(Playback::new(&config, dir.path().join("missing.csv"), z2c, 3).is_err());
        Ok(())
    }

    #[test]
    fn cancelled() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let (mut config, z2c) = setup(dir.path())?;
        config.interval = 60.;
        let mut playback = Playback::new(&config, dir.path().join("ZernikeMags.csv"), z2c, 3)?;
        let canceller = playback.canceller();
        let handle = thread::spawn(move || {
            let mut dm = SimulatedMirror::connect("BAX200", 3);
            playback.run(&mut dm).map(|state| (state, dm))
        });
        thread::sleep(std::time::Duration::from_millis(50));
        watch(Cursor::new("stop\n"), canceller).join().unwrap();
        let (state, dm) = handle.join().unwrap()?;
        assert_eq!(state, PlayerState::Aborted(AbortReason::Cancelled));
        assert_eq!(dm.n_send(), 2);
        assert_eq!(dm.command(), [0.; 3]);
        Ok(())
    }
}
