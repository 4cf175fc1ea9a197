use std::{error::Error, fs};

use dm_clients_modal::{ActuatorSink, Session};
use dm_control::{console::Console, DmConfig, SimulatedMirror};

#[test]
fn interactive() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let z2c: Vec<String> = (0..12)
        .map(|i| {
            (0..97)
                .map(|j| if j % 12 == i { "0.5" } else { "0" })
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();
    fs::write(dir.path().join("BAX123-Z2C.csv"), z2c.join("\n"))?;
    let config_path = dir.path().join("dm.toml");
    fs::write(
        &config_path,
        format!("config_dir = {:?}\nn_mode = 4\n", dir.path()),
    )?;

    let config = DmConfig::load(&config_path)?;
    let z2c = config.calibration("BAX123")?;
    assert_eq!(z2c.n_mode(), 12);
    assert_eq!(z2c.n_actuator(), 97);

    let mut dm = SimulatedMirror::connect("BAX123", config.n_actuator);
    let n_actuator = dm.n_actuator()?;
    dm.send(&vec![0.; n_actuator])?;
    let session = Session::new(z2c, n_actuator).n_mode(config.n_mode)?;
    assert_eq!(session.mode_count(), 4);

    let mut output = Vec::new();
    Console::new(session, &mut dm).run(
        &b"set 1 100\nset 4 -100\nmodes 2\nshow\nsend\n"[..],
        &mut output,
    )?;
    let output = String::from_utf8(output)?;
    assert!(output.contains("Tilt Y"));
    assert!(output.contains("values sent to the mirror"));

    assert_eq!(dm.n_send(), 2);
    let command = dm.command();
    assert_eq!(command[0], 0.5);
    assert_eq!(command[12], 0.5);
    assert_eq!(command[3], 0.);
    assert_eq!(command[1], 0.);
    Ok(())
}
