//! DEFORMABLE MIRROR CONTROL
//!
//! Connects to a deformable mirror and either sets the Zernike modes interactively
//! or plays a table of modal coefficients.
//!
//! Interactive console with the first 12 modes:
//! ```shell
//! RUST_LOG=info cargo run -r -- --serial BAX123 interactive --modes 12
//! ```
//!
//! Playback of the first 5 rows of a table, one row every 2s:
//! ```shell
//! RUST_LOG=info cargo run -r -- --serial BAX123 playback ZernikeMags.csv --interval 2 --steps 5
//! ```

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dm_clients_modal::{ActuatorSink, Session};
use dm_control::{console::Console, playback, DmConfig, SimulatedMirror};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// mirror serial number (BXXYYY, see the mirror backside)
    #[arg(short, long)]
    serial: Option<String>,
    /// directory of the `<serial>-Z2C.csv` calibration files
    #[arg(long)]
    config_dir: Option<PathBuf>,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Sets the Zernike modes one at a time
    Interactive {
        /// number of active modes
        #[arg(short, long)]
        modes: Option<usize>,
    },
    /// Plays a table of modal coefficients
    Playback {
        /// table of modal coefficients
        table: PathBuf,
        /// time interval between 2 steps [s]
        #[arg(short, long)]
        interval: Option<f64>,
        /// maximum number of steps
        #[arg(long)]
        steps: Option<usize>,
        /// hides the progress bar
        #[arg(long)]
        quiet: bool,
    },
}

fn prompt_serial() -> anyhow::Result<String> {
    println!("Please enter the S/N within the following format BXXYYY (see DM backside): ");
    io::stdout().flush()?;
    let mut serial = String::new();
    io::stdin().lock().read_line(&mut serial)?;
    let serial = serial.trim();
    anyhow::ensure!(!serial.is_empty(), "no serial number given");
    Ok(serial.to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DmConfig::load(path)?,
        None => DmConfig::default(),
    };
    if let Some(config_dir) = cli.config_dir {
        config.config_dir = config_dir;
    }
    let serial = match cli.serial.or(config.serial.take()) {
        Some(serial) => serial,
        None => prompt_serial()?,
    };

    let z2c = config
        .calibration(&serial)
        .with_context(|| format!("failed to load the calibration of the mirror {serial}"))?;
    let mut dm = SimulatedMirror::connect(&serial, config.n_actuator);
    let n_actuator = dm.n_actuator()?;
    println!("Number of actuators for {serial}: {n_actuator}");
    println!("Send 0 on each actuator");
    dm.send(&vec![0f64; n_actuator])?;

    match cli.mode {
        Mode::Interactive { modes } => {
            let session = Session::new(z2c, n_actuator).n_mode(modes.unwrap_or(config.n_mode))?;
            Console::new(session, &mut dm).run(io::stdin().lock(), io::stdout())?;
        }
        Mode::Playback {
            table,
            interval,
            steps,
            quiet,
        } => {
            if let Some(interval) = interval {
                config.interval = interval;
            }
            if steps.is_some() {
                config.max_steps = steps;
            }
            config.progress &= !quiet;
            let mut playback = playback::Playback::new(&config, &table, z2c, n_actuator)
                .with_context(|| format!("failed to load the playback table {table:?}"))?;
            println!("Playing {} steps, press Enter to stop", playback.n_step());
            playback::watch(io::BufReader::new(io::stdin()), playback.canceller());
            let state = playback.run(&mut dm)?;
            println!("Playback {state:?}");
        }
    }
    dm.disconnect();
    Ok(())
}
