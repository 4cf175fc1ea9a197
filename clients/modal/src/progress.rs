use indicatif::{ProgressBar, ProgressStyle};

use crate::{AbortReason, PlayerState};

/// Sequence playback report
///
/// A report is started when the playback starts, told about each step sent to
/// the mirror and ended with the final state of the player.
pub trait PlaybackReport: Sized {
    /// Starts the report of a playback of `n_step` steps
    fn start(n_step: usize) -> Self;
    /// Reports that the sequence `step` has been sent to the mirror
    fn step(&mut self, step: usize);
    /// Ends the report
    fn end(&mut self, _state: PlayerState) {}
}

impl PlaybackReport for ProgressBar {
    fn start(n_step: usize) -> Self {
        let bar = ProgressBar::new(n_step as u64);
        let template = "playback [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}";
        if let Ok(style) = ProgressStyle::with_template(template) {
            bar.set_style(style);
        }
        bar
    }
    fn step(&mut self, step: usize) {
        self.set_position(step as u64 + 1);
        self.set_message(format!("step #{step} sent"));
    }
    fn end(&mut self, state: PlayerState) {
        match state {
            PlayerState::Completed => self.finish_with_message("completed"),
            PlayerState::Aborted(AbortReason::Cancelled) => {
                self.abandon_with_message("cancelled")
            }
            PlayerState::Aborted(AbortReason::Failed) => self.abandon_with_message("failed"),
            PlayerState::Idle | PlayerState::Running { .. } => self.abandon(),
        }
    }
}
