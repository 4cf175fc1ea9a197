//! Interactive modal command console
//!
//! The console reads one command per line:
//!
//! | command | action |
//! |---|---|
//! | `modes <n>` | sets the number of active modes |
//! | `set <mode> <percent>` | sets a mode (`1` is the first mode) to a percentage of its limit |
//! | `reset` | sets all the modes to zero |
//! | `send` | sends the actuator command to the mirror |
//! | `show` | prints the modes and the actuator command |
//! | `help` | prints the list of commands |
//! | `quit` | leaves the console |
//!
//! After each change of the modes, the statistics of the updated actuator command are printed.

use std::{
    io::{BufRead, Write},
    str::FromStr,
};

use dm_clients_io::mirror::ActuatorCommand;
use dm_clients_modal::{ActuatorLayout, ActuatorSink, Session};
use flume::Receiver;
use interface::Data;

use crate::{DmControlError, Result, Statistics};

/// Percentage range of a mode
pub const PERCENT_RANGE: (f64, f64) = (-100., 100.);

const HELP: &str = "commands:
  modes <n>              sets the number of active modes
  set <mode> <percent>   sets a mode to a percentage of its limit [-100,100]
  reset                  sets all the modes to zero
  send                   sends the actuator command to the mirror
  show                   prints the modes and the actuator command
  help                   prints this message
  quit                   leaves the console";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command {0:?}, type `help` for the list of commands")]
    Unknown(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {what} {value:?}, the previous value is kept")]
    Invalid { what: &'static str, value: String },
}

/// Console commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Modes(usize),
    /// `mode` starts at 1
    Set { mode: usize, percent: f64 },
    Reset,
    Send,
    Show,
    Help,
    Quit,
}

fn argument<T: FromStr>(
    arg: Option<&str>,
    what: &'static str,
) -> std::result::Result<T, CommandError> {
    let value = arg.ok_or(CommandError::Missing(what))?;
    value.parse().map_err(|_| CommandError::Invalid {
        what,
        value: value.to_string(),
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut args = s.split_whitespace();
        match args.next().unwrap_or_default() {
            "modes" => Ok(Command::Modes(argument(args.next(), "number of modes")?)),
            "set" => {
                let mode: usize = argument(args.next(), "mode")?;
                let percent: f64 = argument(args.next(), "percentage")?;
                if mode == 0 {
                    return Err(CommandError::Invalid {
                        what: "mode",
                        value: mode.to_string(),
                    });
                }
                if !percent.is_finite() {
                    return Err(CommandError::Invalid {
                        what: "percentage",
                        value: percent.to_string(),
                    });
                }
                Ok(Command::Set { mode, percent })
            }
            "reset" => Ok(Command::Reset),
            "send" => Ok(Command::Send),
            "show" => Ok(Command::Show),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Interactive console
///
/// The console owns the modal [Session] and borrows the mirror for its lifetime.
pub struct Console<'a, S: ?Sized> {
    session: Session,
    sink: &'a mut S,
    layout: Option<ActuatorLayout>,
    updates: Receiver<Data<ActuatorCommand>>,
}

impl<'a, S: ActuatorSink + ?Sized> Console<'a, S> {
    /// Creates a console for a [Session] and a mirror
    ///
    /// The actuator command is printed on the 97 actuators grid
    /// if the mirror has 97 actuators.
    pub fn new(mut session: Session, sink: &'a mut S) -> Self {
        let updates = session.subscribe();
        let layout = Some(ActuatorLayout::dm97())
            .filter(|layout| layout.n_actuator() == session.n_actuator());
        Self {
            session,
            sink,
            layout,
            updates,
        }
    }
    /// Sets the actuator layout
    pub fn layout(mut self, layout: ActuatorLayout) -> Self {
        let n_actuator = self.session.n_actuator();
        self.layout = Some(layout).filter(|layout| layout.n_actuator() == n_actuator);
        self
    }
    /// Returns the modal session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs the console until `quit` or the end of the input
    ///
    /// Errors of the modal command engine are printed and the console keeps running
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "{HELP}")?;
        self.show(&mut output)?;
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => match self.execute(command, &mut output) {
                    Ok(()) => (),
                    Err(DmControlError::Modal(e)) => writeln!(output, "error: {e}")?,
                    Err(e) => return Err(e),
                },
                Err(e) => writeln!(output, "{e}")?,
            }
            if let Some(command) = self.updates.drain().last() {
                writeln!(output, "actuator command: {}", Statistics::new(&command))?;
            }
        }
        log::info!("leaving the console");
        Ok(())
    }

    /// Executes a console command
    pub fn execute<W: Write>(&mut self, command: Command, mut output: W) -> Result<()> {
        match command {
            Command::Modes(n) => {
                self.session.set_mode_count(n)?;
                writeln!(output, "{n} active modes")?;
            }
            Command::Set { mode, percent } => {
                let (min, max) = PERCENT_RANGE;
                let clamped = percent.clamp(min, max);
                if clamped != percent {
                    writeln!(output, "{percent}% is clamped to {clamped}%")?;
                }
                let n_mode = self.session.mode_count();
                let Some(index) = mode.checked_sub(1).filter(|&index| index < n_mode) else {
                    writeln!(
                        output,
                        "error: mode {mode} is not active (active modes: 1 to {n_mode})"
                    )?;
                    return Ok(());
                };
                self.session.set_percent(index, clamped)?;
            }
            Command::Reset => {
                self.session.reset();
            }
            Command::Send => {
                let command = self.session.dispatch(&mut *self.sink)?;
                writeln!(
                    output,
                    "values sent to the mirror: {}",
                    Statistics::new(&command)
                )?;
            }
            Command::Show => self.show(&mut output)?,
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Quit => (),
        }
        Ok(())
    }

    /// Prints the active modes and the actuator command
    pub fn show<W: Write>(&mut self, mut output: W) -> Result<()> {
        for (i, (name, value)) in self.session.modes().enumerate() {
            let percent = value * 1e2;
            let bar = "#".repeat((percent.abs() / 5.).round() as usize);
            let sign = if percent < 0. { '-' } else { '+' };
            writeln!(output, "{:>3} {:<28} {:>+7.1}% {sign}{bar}", i + 1, name, percent)?;
        }
        let Some(command) =
            <Session as interface::Write<ActuatorCommand>>::write(&mut self.session)
        else {
            writeln!(output, "actuator command unavailable")?;
            return Ok(());
        };
        writeln!(output, "actuator command: {}", Statistics::new(&command))?;
        if let Some(layout) = &self.layout {
            let width = layout.width();
            for row in layout.split(&command)? {
                let indent = " ".repeat((width - row.len()) * 3);
                let cells: Vec<_> = row.iter().map(|x| format!("{x:+.2}")).collect();
                writeln!(output, "{indent}{}", cells.join(" "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use dm_clients_modal::CalibrationMatrix;

    use super::*;
    use crate::SimulatedMirror;

    fn session() -> Session {
        let z2c = CalibrationMatrix::from_rows(vec![vec![1., 0., -1.], vec![0., 1., 1.]]).unwrap();
        Session::new(z2c, 3)
    }

    #[test]
    fn parse() {
        assert_eq!("modes 12".parse(), Ok(Command::Modes(12)));
        assert_eq!(
            " set 2  -35.5 ".parse(),
            Ok(Command::Set {
                mode: 2,
                percent: -35.5
            })
        );
        assert_eq!("quit".parse(), Ok(Command::Quit));
        assert!(matches!(
            "set 1 abc".parse::<Command>(),
            Err(CommandError::Invalid { .. })
        ));
        assert!(matches!(
            "set 0 10".parse::<Command>(),
            Err(CommandError::Invalid { what: "mode", .. })
        ));
        assert_eq!("modes".parse::<Command>(), Err(CommandError::Missing("number of modes")));
        assert!(matches!(
            "focus".parse::<Command>(),
            Err(CommandError::Unknown(_))
        ));
    }

    #[test]
    fn send() -> std::result::Result<(), Box<dyn Error>> {
        let mut dm = SimulatedMirror::connect("BAX123", 3);
        let mut output = Vec::new();
        let mut console = Console::new(session(), &mut dm);
        console.run(&b"set 1 50\nset 2 50\nsend\nquit\nset 1 0\n"[..], &mut output)?;
        assert_eq!(console.session().coefficients(), [0.5, 0.5]);
        assert_eq!(dm.command(), [0.5, 0.5, 0.]);
        assert_eq!(dm.n_send(), 1);
        let output = String::from_utf8(output)?;
        assert!(output.contains("values sent to the mirror"));
        Ok(())
    }

    #[test]
    fn invalid_inputs() -> std::result::Result<(), Box<dyn Error>> {
        let mut dm = SimulatedMirror::connect("BAX123", 3);
        let mut output = Vec::new();
        let mut console = Console::new(session(), &mut dm);
        console.run(
            &b"set 1 25\nset 1 abc\nmodes 0\nset 3 10\nset 2 250\n"[..],
            &mut output,
        )?;
        assert_eq!(console.session().coefficients(), [0.25, 1.]);
        let output = String::from_utf8(output)?;
        assert!(output.contains("the previous value is kept"));
        assert!(output.contains("error: the number of modes"));
        assert!(output.contains("error: mode 3 is not active (active modes: 1 to 2)"));
        assert!(output.contains("250% is clamped to 100%"));
        Ok(())
    }

    #[test]
    fn unplugged_mirror() -> std::result::Result<(), Box<dyn Error>> {
        let mut dm = SimulatedMirror::connect("BAX123", 3);
        dm.disconnect();
        let mut output = Vec::new();
        let mut console = Console::new(session(), &mut dm);
        console.run(&b"set 1 10\nsend\n"[..], &mut output)?;
        let output = String::from_utf8(output)?;
        assert!(output.contains("error: actuator sink unavailable"));
        Ok(())
    }

    #[test]
    fn layout() -> std::result::Result<(), Box<dyn Error>> {
        let mut dm = SimulatedMirror::connect("BAX123", 3);
        let mut output = Vec::new();
        let mut console =
            Console::new(session(), &mut dm).layout(ActuatorLayout::new(vec![1, 2], 1.));
        console.execute(Command::Set { mode: 1, percent: 100. }, &mut output)?;
        console.execute(Command::Show, &mut output)?;
        let output = String::from_utf8(output)?;
        assert!(output.contains("   +1.00\n+0.00 -1.00\n"));
        Ok(())
    }
}
