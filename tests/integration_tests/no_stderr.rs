// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, tecsim, write_cube, write_observation};

#[test]
fn test_tec_wave_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let obs = write_observation(tmp_dir.path(), 2, &[("centre", 123.4, 48.2)]);
    let output = tmp_dir.path().join("tec.fits");

    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "tec",
            "--method", "wave",
            "--observation", &format!("{}", obs.display()),
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "tec failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_tec_fits_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let obs = write_observation(tmp_dir.path(), 2, &[("centre", 123.4, 48.2)]);
    let cube = write_cube(tmp_dir.path(), 2);

    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "tec",
            "--observation", &format!("{}", obs.display()),
            "--fits-cube", &format!("{}", cube.display()),
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "tec failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
