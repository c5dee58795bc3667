// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! End-to-end tests of `tecsim tec`.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use tecsim::{parset::keys, ParameterSet, ParsetValue, SolutionTable};

use crate::{cube_value, get_cmd_output, tecsim, write_cube, write_observation, START_MJD_S};

const DIRECTIONS: [(&str, f64, f64); 3] = [
    ("centre", 123.4, 48.2),
    ("far", 300.0, -50.0),
    ("north", 123.4, 49.2),
];

#[test]
fn test_fits_cube() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let obs = write_observation(tmp_dir.path(), 2, &DIRECTIONS);
    let cube = write_cube(tmp_dir.path(), 2);
    let parset = tmp_dir.path().join("predict.toml");

    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "tec",
            "--method", "fits",
            "--observation", &format!("{}", obs.display()),
            "--fits-cube", &format!("{}", cube.display()),
            "--parameters", &format!("{}", parset.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "tec failed: {}", cmd.err().unwrap());

    // The default output sits next to the cube.
    let output = tmp_dir.path().join("screen.h5parm.fits");
    let table = SolutionTable::read(&output).unwrap();
    assert_eq!(table.tec.values.dim(), (2, 2, 3, 2));
    assert_abs_diff_eq!(table.tec.axes.times[0], START_MJD_S);
    assert_abs_diff_eq!(table.tec.axes.times[1], START_MJD_S + 10.0);
    assert_abs_diff_eq!(table.tec.axes.freqs[1], 130e6);
    assert_eq!(table.tec.axes.directions, vec!["centre", "far", "north"]);

    for t in 0..2 {
        for a in 0..2 {
            for f in 0..2 {
                assert_abs_diff_eq!(table.tec.values[(t, a, 0, f)], cube_value(t, f, a, 5, 5));
                assert_abs_diff_eq!(table.tec.weights[(t, a, 0, f)], 1.0);
                // Off the image: neutral value, zero weight.
                assert_abs_diff_eq!(table.tec.values[(t, a, 1, f)], 1.0);
                assert_abs_diff_eq!(table.tec.weights[(t, a, 1, f)], 0.0);
                assert_abs_diff_eq!(table.tec.values[(t, a, 2, f)], cube_value(t, f, a, 6, 5));
            }
        }
    }
    assert_eq!(table.history.len(), 1);
    assert!(table.history[0].contains(&format!("FITS cube {}", cube.display())));

    let parset = ParameterSet::read(&parset).unwrap();
    assert_eq!(
        parset.get(keys::APPLYCAL_PARMDB),
        Some(&ParsetValue::Str(output.display().to_string()))
    );
    assert_eq!(
        parset.get(keys::APPLYCAL_STEPS),
        Some(&ParsetValue::List(vec!["tec".to_string()]))
    );
}

#[test]
fn test_fits_cube_antenna_mismatch() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let obs = write_observation(tmp_dir.path(), 3, &DIRECTIONS);
    let cube = write_cube(tmp_dir.path(), 2);
    let output = tmp_dir.path().join("tec.fits");
    let parset = tmp_dir.path().join("predict.toml");

    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "tec",
            "--observation", &format!("{}", obs.display()),
            "--fits-cube", &format!("{}", cube.display()),
            "--output", &format!("{}", output.display()),
            "--parameters", &format!("{}", parset.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("2 antennas"), "{stderr}");
    assert!(!output.exists());
    assert!(!parset.exists());
}

#[test]
fn test_unknown_method() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let obs = write_observation(tmp_dir.path(), 2, &DIRECTIONS);
    let output = tmp_dir.path().join("tec.fits");

    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "tec",
            "--method", "polynomial",
            "--observation", &format!("{}", obs.display()),
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("polynomial"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn test_wave_with_saved_arguments() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let obs = write_observation(tmp_dir.path(), 2, &DIRECTIONS);
    let output = tmp_dir.path().join("tec.fits");
    let args_toml = tmp_dir.path().join("args.toml");

    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "tec",
            "--method", "wave",
            "--observation", &format!("{}", obs.display()),
            "--output", &format!("{}", output.display()),
            "--tid-amplitude", "0.3",
            "--tid-azimuth", "-45",
            "--num-threads", "3",
            "--save-toml", &format!("{}", args_toml.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "tec failed: {}", cmd.err().unwrap());
    let first = SolutionTable::read(&output).unwrap();
    assert_eq!(first.tec.values.dim(), (3, 2, 3, 2));
    assert!(first.tec.weights.iter().all(|&w| w == 1.0));
    assert!(first.tec.values.iter().all(|v| v.is_finite() && v.abs() < 10.0));

    // Re-running from the saved arguments (with a single thread) replaces the
    // table with an identical one.
    let cmd = tecsim()
        .args([
            "tec",
            &format!("{}", args_toml.display()),
            "--num-threads",
            "1",
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "tec failed: {}", cmd.err().unwrap());
    let second = SolutionTable::read(&output).unwrap();
    assert_eq!(first.tec.values, second.tec.values);
    assert_eq!(first.tec.axes, second.tec.axes);
}

#[test]
fn test_existing_table_is_replaced() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("tec.fits");

    let obs = write_observation(tmp_dir.path(), 2, &DIRECTIONS);
    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "tec",
            "--observation", &format!("{}", obs.display()),
            "--output", &format!("{}", output.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "tec failed: {}", cmd.err().unwrap());
    assert_eq!(SolutionTable::read(&output).unwrap().directions.len(), 3);

    let obs = write_observation(tmp_dir.path(), 2, &DIRECTIONS[..1]);
    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "tec",
            "--observation", &format!("{}", obs.display()),
            "--output", &format!("{}", output.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "tec failed: {}", cmd.err().unwrap());
    let table = SolutionTable::read(&output).unwrap();
    assert_eq!(table.directions.len(), 1);
    assert_eq!(table.tec.values.dim(), (3, 2, 1, 2));
    assert_eq!(table.history.len(), 1);
}

#[test]
fn test_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let obs = write_observation(tmp_dir.path(), 2, &DIRECTIONS);
    let output = tmp_dir.path().join("tec.fits");
    let parset = tmp_dir.path().join("predict.toml");

    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "tec",
            "--observation", &format!("{}", obs.display()),
            "--output", &format!("{}", output.display()),
            "--parameters", &format!("{}", parset.display()),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "tec failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!output.exists());
    assert!(!parset.exists());
}
