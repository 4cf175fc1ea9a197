use std::time::{Duration, Instant};

use flume::{Receiver, RecvTimeoutError, Sender};
use interface::print_info;

use crate::{
    normalize, sink, ActuatorSink, CalibrationMatrix, ModalError, PlaybackReport,
    PlaybackSequence, Result,
};

/// Default time interval between 2 consecutive steps of a sequence
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Reason for a sequence playback to end before completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Playback stopped on request
    Cancelled,
    /// A step of the playback failed
    Failed,
}

/// Sequence player states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// The sequence is loaded and no step has been played
    Idle,
    /// The sequence `step` is being played
    Running { step: usize },
    /// All the steps have been played
    Completed,
    /// The playback ended before completion
    Aborted(AbortReason),
}

/// Playback cancellation handle
#[derive(Debug, Clone)]
pub struct Canceller(Sender<()>);
impl Canceller {
    /// Requests the playback to stop
    ///
    /// The request is processed at the next wait between 2 steps
    pub fn cancel(&self) {
        log::info!("sequence playback stop requested");
        // the player owns a receiver for as long as it exists
        let _ = self.0.send(());
    }
}

/// Modal sequence player
///
/// Plays each row of a [PlaybackSequence] once and in order:
/// each row is transformed into an actuator command, normalized, sent to the mirror
/// and followed by a blocking wait of [interval](Player::interval).
/// Once all the rows have been played, or if the playback is cancelled,
/// a zero command is sent to the mirror and the mirror is reset.
/// If a step fails, no command is sent anymore and the mirror is reset.
pub struct Player<P = indicatif::ProgressBar> {
    sequence: PlaybackSequence,
    z2c: CalibrationMatrix,
    n_actuator: usize,
    interval: Duration,
    max_steps: Option<usize>,
    state: PlayerState,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    progress: bool,
    report: Option<P>,
}

impl<P: PlaybackReport> Player<P> {
    /// Creates a new player for a mirror with `n_actuator` actuators
    pub fn new(sequence: PlaybackSequence, z2c: CalibrationMatrix, n_actuator: usize) -> Self {
        let (stop_tx, stop_rx) = flume::unbounded();
        Self {
            sequence,
            z2c,
            n_actuator,
            interval: DEFAULT_INTERVAL,
            max_steps: None,
            state: PlayerState::Idle,
            stop_tx,
            stop_rx,
            progress: false,
            report: None,
        }
    }
    /// Sets the time interval between 2 consecutive steps
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
    /// Sets the maximum number of steps to play
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
    /// Reports the playback progress, with a progress bar by default
    pub fn progress(mut self) -> Self {
        self.progress = true;
        self
    }
    /// Returns the player state
    pub fn state(&self) -> PlayerState {
        self.state
    }
    /// Returns the number of steps the player plays
    pub fn n_step(&self) -> usize {
        self.max_steps
            .map_or(self.sequence.len(), |n| n.min(self.sequence.len()))
    }
    /// Returns a handle to stop the playback
    pub fn canceller(&self) -> Canceller {
        Canceller(self.stop_tx.clone())
    }
    /// Returns the player to the [PlayerState::Idle] state
    pub fn rewind(&mut self) -> &mut Self {
        self.state = PlayerState::Idle;
        self
    }
    /// Returns the normalized actuator command of the sequence `step`
    pub fn command(&self, step: usize) -> Result<Vec<f64>> {
        let coefficients = self
            .sequence
            .row(step)
            .ok_or(ModalError::IndexOutOfRange {
                index: step,
                n_mode: self.sequence.len(),
            })?;
        normalize(&self.z2c.transform(coefficients)?)
    }

    /// Plays the sequence
    ///
    /// Returns the final state of the player, either [PlayerState::Completed] or
    /// [PlayerState::Aborted] with [AbortReason::Cancelled].
    /// A failed step returns the error, leaving the player in the
    /// [PlayerState::Aborted] state with [AbortReason::Failed].
    pub fn run<S: ActuatorSink + ?Sized>(&mut self, sink: &mut S) -> Result<PlayerState> {
        if self.state != PlayerState::Idle {
            return Err(ModalError::NotIdle(self.state));
        }
        // stop requests issued before the playback are void
        self.stop_rx.drain().for_each(drop);
        let n_step = self.n_step();
        log::info!(
            "playing {n_step} steps of {} modes every {:?}",
            self.sequence.n_mode(),
            self.interval
        );
        if self.progress {
            self.report = Some(P::start(n_step));
        }
        let now = Instant::now();
        for step in 0..n_step {
            self.state = PlayerState::Running { step };
            if let Err(e) = self
                .command(step)
                .and_then(|command| sink::dispatch(sink, &command, self.n_actuator))
            {
                print_info(format!("sequence playback failed at step #{step}"), Some(&e));
                self.state = PlayerState::Aborted(AbortReason::Failed);
                self.end_report();
                if let Err(e) = sink.reset() {
                    print_info("mirror reset failed", Some(&e));
                }
                return Err(e);
            }
            log::debug!("step #{step} sent");
            if let Some(report) = self.report.as_mut() {
                report.step(step)
            }
            match self.stop_rx.recv_timeout(self.interval) {
                Ok(()) => {
                    log::info!("sequence playback cancelled after step #{step}");
                    let parked = self.park(sink, PlayerState::Aborted(AbortReason::Cancelled));
                    self.end_report();
                    return parked;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => (),
            }
        }
        log::info!(
            "sequence playback completed in {:.3}s",
            now.elapsed().as_secs_f64()
        );
        let parked = self.park(sink, PlayerState::Completed);
        self.end_report();
        parked
    }

    fn end_report(&mut self) {
        if let Some(mut report) = self.report.take() {
            report.end(self.state)
        }
    }

    /// Sends the zero command and resets the mirror
    fn park<S: ActuatorSink + ?Sized>(
        &mut self,
        sink: &mut S,
        state: PlayerState,
    ) -> Result<PlayerState> {
        log::info!("sending 0 on all actuators");
        let zero = sink::dispatch(sink, &vec![0f64; self.n_actuator], self.n_actuator);
        let reset = sink.reset().map_err(ModalError::from);
        match zero.and(reset) {
            Ok(()) => {
                self.state = state;
                Ok(state)
            }
            Err(e) => {
                print_info("mirror parking failed", Some(&e));
                self.state = PlayerState::Aborted(AbortReason::Failed);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModeRange, SinkError};

    #[derive(Default)]
    struct Mirror {
        sent: Vec<Vec<f64>>,
        n_reset: usize,
    }
    impl ActuatorSink for Mirror {
        fn get(&mut self, attribute: &str) -> std::result::Result<f64, SinkError> {
            Err(SinkError::UnknownAttribute(attribute.into()))
        }
        fn send(&mut self, command: &[f64]) -> std::result::Result<(), SinkError> {
            self.sent.push(command.to_vec());
            Ok(())
        }
        fn reset(&mut self) -> std::result::Result<(), SinkError> {
            self.n_reset += 1;
            Ok(())
        }
    }

    fn player(rows: Vec<Vec<f64>>) -> Player {
        let n_mode = rows.first().map_or(1, |row| row.len());
        let sequence = PlaybackSequence::new(
            vec![],
            vec![ModeRange { min: -1., max: 1. }; n_mode],
            rows,
        )
        .unwrap();
        let z2c = CalibrationMatrix::from_rows(vec![vec![1., 0., -1.], vec![0., 1., 1.]]).unwrap();
        Player::new(sequence, z2c, 3).interval(Duration::from_millis(1))
    }

    #[test]
    fn bounded_steps() {
        let mut player = player(vec![vec![0.1]; 8]).max_steps(5);
        assert_eq!(player.n_step(), 5);
        let mut mirror = Mirror::default();
        assert_eq!(player.run(&mut mirror).unwrap(), PlayerState::Completed);
        assert_eq!(mirror.sent.len(), 6);
        assert_eq!(mirror.sent[5], vec![0.; 3]);
        assert_eq!(mirror.n_reset, 1);
    }

    #[test]
    fn rerun() {
        let mut player = player(vec![vec![0.1, 0.2]; 2]);
        let mut mirror = Mirror::default();
        player.run(&mut mirror).unwrap();
        assert!(matches!(
            player.run(&mut mirror),
            Err(ModalError::NotIdle(PlayerState::Completed))
        ));
        player.rewind();
        assert_eq!(player.run(&mut mirror).unwrap(), PlayerState::Completed);
        assert_eq!(mirror.sent.len(), 6);
        assert_eq!(mirror.sent[0], mirror.sent[3]);
    }

    #[test]
    fn failed_step() {
        let mut player = player(vec![vec![0.1, 0.2, 0.3]]);
        let mut mirror = Mirror::default();
        assert!(matches!(
            player.run(&mut mirror),
            Err(ModalError::DimensionMismatch { .. })
        ));
        assert_eq!(player.state(), PlayerState::Aborted(AbortReason::Failed));
        assert!(mirror.sent.is_empty());
        assert_eq!(mirror.n_reset, 1);
    }

    static REPORT: std::sync::Mutex<Vec<String>> = std::sync::Mutex::new(Vec::new());
    struct Report;
    impl PlaybackReport for Report {
        fn start(n_step: usize) -> Self {
            REPORT.lock().unwrap().push(format!("start {n_step}"));
            Report
        }
        fn step(&mut self, step: usize) {
            REPORT.lock().unwrap().push(format!("step {step}"));
        }
        fn end(&mut self, state: PlayerState) {
            REPORT.lock().unwrap().push(format!("end {state:?}"));
        }
    }

    #[test]
    fn report() {
        let sequence = PlaybackSequence::new(
            vec![],
            vec![ModeRange { min: -1., max: 1. }],
            vec![vec![0.1]; 3],
        )
        .unwrap();
        let z2c = CalibrationMatrix::from_rows(vec![vec![1., 0., -1.]]).unwrap();
        let mut player: Player<Report> = Player::new(sequence, z2c, 3)
            .interval(Duration::from_millis(1))
            .max_steps(2)
            .progress();
        player.run(&mut Mirror::default()).unwrap();
        assert_eq!(
            *REPORT.lock().unwrap(),
            ["start 2", "step 0", "step 1", "end Completed"]
        );
    }

    #[test]
    fn stale_cancel() {
        let mut player = player(vec![vec![0.5]]);
        player.canceller().cancel();
        let mut mirror = Mirror::default();
        assert_eq!(player.run(&mut mirror).unwrap(), PlayerState::Completed);
    }
}
