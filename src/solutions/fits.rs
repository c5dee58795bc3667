// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading and writing TEC solution tables as FITS files.
//!
//! - Primary HDU: keys `SOLSET`, `SOLTAB`, `SOFTWARE` and `CMDLINE`.
//! - Image HDU named after the solution table (e.g. `tec000`): the TEC values
//!   with dimensions (time, ant, dir, freq). Keys `SOLTYPE = 'tec'`, `AXES`,
//!   and the history as long strings `HIST0000`, `HIST0001`, ...
//! - Image HDU `WEIGHTS`: the weights, with the same dimensions.
//! - Table HDUs `TIME` (`Time`, MJD seconds) and `FREQ` (`Freq`, Hz).
//! - Table HDU `ANTENNA`: `Name`, and geocentric `X`, `Y`, `Z` \[metres\].
//! - Table HDU `SOURCE`: `Name`, `RA` and `Dec` \[degrees\].

use std::path::Path;

use fitsio::{
    images::{ImageDescription, ImageType},
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};
use log::{debug, trace};
use marlu::{RADec, XyzGeocentric};
use ndarray::prelude::*;

use super::{SolutionTable, SolutionsReadError, SolutionsWriteError};
use crate::{
    constants::{SOLSET_NAME, SOLTAB_TYPE},
    io::fits::*,
    obs::{SkyDirection, Station},
    tec::{TecAxes, TecValues},
};

const AXES: &str = "time,ant,dir,freq";
const RESERVED_HDU_NAMES: [&str; 5] = ["WEIGHTS", "TIME", "FREQ", "ANTENNA", "SOURCE"];

pub(crate) fn check_soltab_name(soltab: &str) -> Result<(), SolutionsWriteError> {
    let valid = !soltab.is_empty()
        && soltab.len() <= 68
        && soltab
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !RESERVED_HDU_NAMES.contains(&soltab.to_uppercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(SolutionsWriteError::BadSoltabName(soltab.to_string()))
    }
}

/// Write `table` into a staging directory next to `file`, then rename it over
/// `file`. The staging directory is removed whatever happens.
pub(super) fn write(table: &SolutionTable, file: &Path) -> Result<(), SolutionsWriteError> {
    table.check_consistency().map_err(|(thing, expected, actual)| {
        SolutionsWriteError::Inconsistent {
            thing,
            expected,
            actual,
        }
    })?;
    check_soltab_name(&table.soltab)?;

    let parent = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let staging = tempfile::Builder::new()
        .prefix(".tecsim-")
        .tempdir_in(parent)?;
    let staged_file = staging.path().join("table.fits");
    trace!("Staging solution table at {}", staged_file.display());
    write_fits(table, &staged_file)?;
    std::fs::rename(&staged_file, file)?;
    debug!("Wrote solution table {}", file.display());
    Ok(())
}

fn write_fits(table: &SolutionTable, file: &Path) -> Result<(), SolutionsWriteError> {
    let SolutionTable {
        solset,
        soltab,
        tec,
        antennas,
        directions,
        history,
    } = table;

    let mut fptr = fits_create(file)?;
    let hdu = fits_open_hdu(&mut fptr, 0)?;
    hdu.write_key(&mut fptr, "SOLSET", solset.as_str())?;
    hdu.write_key(&mut fptr, "SOLTAB", soltab.as_str())?;
    hdu.write_key(
        &mut fptr,
        "SOFTWARE",
        format!(
            "Created by {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ),
    )?;
    // It's possible that the command-line call has invalid UTF-8. If so, don't
    // bother trying to write the CMDLINE key.
    if let Ok(args) = std::env::args_os()
        .map(|a| a.into_string())
        .collect::<Result<Vec<String>, _>>()
    {
        fits_write_long_string(
            &mut fptr,
            "CMDLINE",
            &args.join(" "),
            Some("Command-line call"),
        )?;
    }

    let dim = {
        let (t, a, d, f) = tec.values.dim();
        [t, a, d, f]
    };
    let image_description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &dim,
    };

    let hdu = fptr.create_image(soltab, &image_description)?;
    hdu.write_key(&mut fptr, "SOLTYPE", SOLTAB_TYPE)?;
    hdu.write_key(&mut fptr, "AXES", AXES)?;
    for (i, entry) in history.iter().enumerate() {
        fits_write_long_string(&mut fptr, &format!("HIST{i:04}"), entry, None)?;
    }
    hdu.write_image(&mut fptr, &tec.values.iter().copied().collect::<Vec<_>>())?;

    let hdu = fptr.create_image("WEIGHTS", &image_description)?;
    hdu.write_image(&mut fptr, &tec.weights.iter().copied().collect::<Vec<_>>())?;

    for (hdu_name, col_name, values) in [
        ("TIME", "Time", &tec.axes.times),
        ("FREQ", "Freq", &tec.axes.freqs),
    ] {
        let col = ColumnDescription::new(col_name)
            .with_type(ColumnDataType::Double)
            .create()?;
        let hdu = fptr.create_table(hdu_name, &[col])?;
        hdu.write_col(&mut fptr, col_name, values)?;
    }

    // Antenna side table.
    {
        let names: Vec<String> = antennas.iter().map(|s| s.name.clone()).collect();
        let cols = name_and_double_cols(&names, ["X", "Y", "Z"])?;
        let hdu = fptr.create_table("ANTENNA", &cols)?;
        hdu.write_col(&mut fptr, "Name", &names)?;
        let xs: Vec<f64> = antennas.iter().map(|s| s.position.x).collect();
        let ys: Vec<f64> = antennas.iter().map(|s| s.position.y).collect();
        let zs: Vec<f64> = antennas.iter().map(|s| s.position.z).collect();
        hdu.write_col(&mut fptr, "X", &xs)?;
        hdu.write_col(&mut fptr, "Y", &ys)?;
        hdu.write_col(&mut fptr, "Z", &zs)?;
    }

    // Direction side table.
    {
        let names: Vec<String> = directions.iter().map(|d| d.name.clone()).collect();
        let cols = name_and_double_cols(&names, ["RA", "Dec"])?;
        let hdu = fptr.create_table("SOURCE", &cols)?;
        hdu.write_col(&mut fptr, "Name", &names)?;
        let ras: Vec<f64> = directions.iter().map(|d| d.radec.ra.to_degrees()).collect();
        let decs: Vec<f64> = directions.iter().map(|d| d.radec.dec.to_degrees()).collect();
        hdu.write_col(&mut fptr, "RA", &ras)?;
        hdu.write_col(&mut fptr, "Dec", &decs)?;
    }

    Ok(())
}

fn name_and_double_cols<const N: usize>(
    names: &[String],
    cols: [&str; N],
) -> Result<Vec<fitsio::tables::ConcreteColumnDescription>, SolutionsWriteError> {
    let max_name_len = names.iter().map(|n| n.len()).max().unwrap_or(0).max(1);
    let mut descriptions = vec![ColumnDescription::new("Name")
        .with_type(ColumnDataType::String)
        .that_repeats(max_name_len)
        .create()?];
    for col in cols {
        descriptions.push(
            ColumnDescription::new(col)
                .with_type(ColumnDataType::Double)
                .create()?,
        );
    }
    Ok(descriptions)
}

pub(super) fn read(file: &Path) -> Result<SolutionTable, SolutionsReadError> {
    debug!("Reading solution table {}", file.display());
    let mut fptr = fits_open(file)?;
    let hdu = fits_open_hdu(&mut fptr, 0)?;
    let solset: String = fits_get_optional_key(&mut fptr, &hdu, "SOLSET")?
        .unwrap_or_else(|| SOLSET_NAME.to_string());
    let soltab: String = fits_get_required_key(&mut fptr, &hdu, "SOLTAB")?;

    let hdu = fits_open_hdu(&mut fptr, soltab.as_str())?;
    let soltype: String = fits_get_required_key(&mut fptr, &hdu, "SOLTYPE")?;
    if soltype != SOLTAB_TYPE {
        return Err(SolutionsReadError::WrongType {
            expected: SOLTAB_TYPE,
            got: soltype,
        });
    }
    let mut history = vec![];
    while let Some(entry) =
        fits_get_optional_key_long_string(&mut fptr, &format!("HIST{:04}", history.len()))?
    {
        history.push(entry);
    }
    let values = read_4d_image(&mut fptr, &hdu)?;
    let hdu = fits_open_hdu(&mut fptr, "WEIGHTS")?;
    let weights = read_4d_image(&mut fptr, &hdu)?;
    if weights.dim() != values.dim() {
        return Err(SolutionsReadError::BadShape {
            thing: "weights",
            expected: values.len(),
            actual: weights.len(),
        });
    }
    let (num_times, num_ants, num_dirs, num_freqs) = values.dim();

    let hdu = fits_open_hdu(&mut fptr, "TIME")?;
    let times: Vec<f64> = fits_get_col(&mut fptr, &hdu, "Time")?;
    let hdu = fits_open_hdu(&mut fptr, "FREQ")?;
    let freqs: Vec<f64> = fits_get_col(&mut fptr, &hdu, "Freq")?;

    let hdu = fits_open_hdu(&mut fptr, "ANTENNA")?;
    let names: Vec<String> = fits_get_col(&mut fptr, &hdu, "Name")?;
    let xs: Vec<f64> = fits_get_col(&mut fptr, &hdu, "X")?;
    let ys: Vec<f64> = fits_get_col(&mut fptr, &hdu, "Y")?;
    let zs: Vec<f64> = fits_get_col(&mut fptr, &hdu, "Z")?;
    let antennas: Vec<Station> = names
        .into_iter()
        .zip(xs)
        .zip(ys)
        .zip(zs)
        .map(|(((name, x), y), z)| Station {
            name,
            position: XyzGeocentric { x, y, z },
        })
        .collect();

    let hdu = fits_open_hdu(&mut fptr, "SOURCE")?;
    let names: Vec<String> = fits_get_col(&mut fptr, &hdu, "Name")?;
    let ras: Vec<f64> = fits_get_col(&mut fptr, &hdu, "RA")?;
    let decs: Vec<f64> = fits_get_col(&mut fptr, &hdu, "Dec")?;
    let directions: Vec<SkyDirection> = names
        .into_iter()
        .zip(ras)
        .zip(decs)
        .map(|((name, ra), dec)| SkyDirection {
            name,
            radec: RADec::from_degrees(ra, dec),
        })
        .collect();

    for (thing, expected, actual) in [
        ("time axis", num_times, times.len()),
        ("frequency axis", num_freqs, freqs.len()),
        ("antenna table", num_ants, antennas.len()),
        ("direction table", num_dirs, directions.len()),
    ] {
        if expected != actual {
            return Err(SolutionsReadError::BadShape {
                thing,
                expected,
                actual,
            });
        }
    }

    let axes = TecAxes {
        times,
        antennas: antennas.iter().map(|s| s.name.clone()).collect(),
        directions: directions.iter().map(|d| d.name.clone()).collect(),
        freqs,
    };
    Ok(SolutionTable {
        solset,
        soltab,
        tec: TecValues {
            values,
            weights,
            axes,
        },
        antennas,
        directions,
        history,
    })
}

fn read_4d_image(
    fptr: &mut FitsFile,
    hdu: &fitsio::hdu::FitsHdu,
) -> Result<Array4<f64>, SolutionsReadError> {
    let dim = match fits_get_image_shape(fptr, hdu)? {
        &[t, a, d, f] => (t, a, d, f),
        s => return Err(SolutionsReadError::BadDimensions { got: s.len() }),
    };
    let data: Vec<f64> = fits_get_image(fptr, hdu)?;
    Ok(Array4::from_shape_vec(dim, data)?)
}
