// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod beam;
mod no_stderr;
mod tec;

use std::{
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use fitsio::{
    images::{ImageDescription, ImageType},
    FitsFile,
};

const START_MJD_S: f64 = 5011243200.0;
const NUM_PIX: usize = 11;

fn tecsim() -> Command {
    Command::cargo_bin("tecsim").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Write an observation description with `num_stations` LOFAR-ish stations and
/// the given (name, RA, Dec) directions.
fn write_observation(dir: &Path, num_stations: usize, directions: &[(&str, f64, f64)]) -> PathBuf {
    let mut contents = format!(
        "freqs_hz = [120e6, 130e6]\n\n[time]\nstart_mjd_s = {START_MJD_S:?}\nresolution_s = 10.0\nnum_timesteps = 3\n"
    );
    for i in 0..num_stations {
        contents.push_str(&format!(
            "\n[[station]]\nname = \"CS{i:03}\"\nposition = [{:?}, {:?}, 5064643.5]\n",
            3826923.5 + 120.0 * i as f64,
            460915.4 - 80.0 * i as f64,
        ));
    }
    for (name, ra, dec) in directions {
        contents.push_str(&format!(
            "\n[[direction]]\nname = \"{name}\"\nra = {ra:?}\ndec = {dec:?}\n"
        ));
    }
    let file = dir.join("obs.toml");
    std::fs::write(&file, contents).unwrap();
    file
}

/// The value in the test cube at (time, freq, antenna, y, x).
fn cube_value(t: usize, f: usize, a: usize, y: usize, x: usize) -> f64 {
    (t * 10000 + f * 1000 + a * 100 + y * 10 + x) as f64
}

/// Write an 11x11 pixel SIN-projected TEC cube centred on (123.4°, 48.2°) with
/// 1° pixels, 2 timesteps and 2 channels.
fn write_cube(dir: &Path, num_ants: usize) -> PathBuf {
    let (num_times, num_freqs) = (2, 2);
    let mut data = Vec::with_capacity(num_times * num_freqs * num_ants * NUM_PIX * NUM_PIX);
    for t in 0..num_times {
        for f in 0..num_freqs {
            for a in 0..num_ants {
                for y in 0..NUM_PIX {
                    for x in 0..NUM_PIX {
                        data.push(cube_value(t, f, a, y, x));
                    }
                }
            }
        }
    }

    let file = dir.join("screen.fits");
    let mut fptr = FitsFile::create(&file)
        .with_custom_primary(&ImageDescription {
            data_type: ImageType::Double,
            dimensions: &[num_times, num_freqs, num_ants, NUM_PIX, NUM_PIX],
        })
        .open()
        .unwrap();
    let hdu = fptr.primary_hdu().unwrap();
    hdu.write_image(&mut fptr, &data).unwrap();
    hdu.write_key(&mut fptr, "CTYPE1", "RA---SIN").unwrap();
    hdu.write_key(&mut fptr, "CTYPE2", "DEC--SIN").unwrap();
    hdu.write_key(&mut fptr, "CRVAL1", 123.4).unwrap();
    hdu.write_key(&mut fptr, "CRVAL2", 48.2).unwrap();
    hdu.write_key(&mut fptr, "CRPIX1", 6.0).unwrap();
    hdu.write_key(&mut fptr, "CRPIX2", 6.0).unwrap();
    hdu.write_key(&mut fptr, "CDELT1", -1.0).unwrap();
    hdu.write_key(&mut fptr, "CDELT2", 1.0).unwrap();
    hdu.write_key(&mut fptr, "CTYPE3", "ANTENNA").unwrap();
    hdu.write_key(&mut fptr, "CTYPE4", "FREQ").unwrap();
    hdu.write_key(&mut fptr, "CRVAL4", 120e6).unwrap();
    hdu.write_key(&mut fptr, "CDELT4", 10e6).unwrap();
    hdu.write_key(&mut fptr, "CTYPE5", "TIME").unwrap();
    hdu.write_key(&mut fptr, "CRVAL5", START_MJD_S).unwrap();
    hdu.write_key(&mut fptr, "CDELT5", 10.0).unwrap();
    file
}
