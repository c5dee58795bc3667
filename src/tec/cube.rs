// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sampling TEC values out of a gridded cube.

use std::path::Path;

use fitsio::{hdu::FitsHdu, FitsFile};
use log::{debug, trace, warn};
use marlu::RADec;
use ndarray::prelude::*;

use super::{CubeError, TecAxes, TecValues};
use crate::{
    coord::{Projection, Wcs, WcsError},
    io::fits::*,
    obs::{SkyDirection, Station},
};

/// A regularly-sampled axis. Element `i` is `reference + increment * i`; the
/// reference value always belongs to the first element, regardless of any
/// reference pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearAxis {
    pub reference: f64,
    pub increment: f64,
    pub len: usize,
}

impl LinearAxis {
    pub fn values(&self) -> Vec<f64> {
        (0..self.len)
            .map(|i| self.reference + self.increment * i as f64)
            .collect()
    }
}

/// A TEC cube. Its data are indexed by (time, frequency, antenna, y, x).
#[derive(Debug, Clone)]
pub struct TecCube {
    pub data: Array5<f64>,
    pub wcs: Wcs,
    pub time: LinearAxis,
    pub freq: LinearAxis,
}

impl TecCube {
    /// Make a new cube. `time` and `freq` are (reference, increment) pairs.
    pub fn new(data: Array5<f64>, wcs: Wcs, time: (f64, f64), freq: (f64, f64)) -> TecCube {
        let (num_times, num_freqs, _, _, _) = data.dim();
        TecCube {
            time: LinearAxis {
                reference: time.0,
                increment: time.1,
                len: num_times,
            },
            freq: LinearAxis {
                reference: freq.0,
                increment: freq.1,
                len: num_freqs,
            },
            data,
            wcs,
        }
    }

    /// Read a TEC cube from the primary HDU of a FITS file.
    pub fn read(file: &Path) -> Result<TecCube, CubeError> {
        debug!("Reading TEC cube {}", file.display());
        let mut fptr = fits_open(file)?;
        let hdu = fits_open_hdu(&mut fptr, 0)?;

        let shape = fits_get_image_shape(&fptr, &hdu)?.to_vec();
        let dim = match shape.as_slice() {
            &[t, f, a, y, x] => (t, f, a, y, x),
            s => {
                return Err(CubeError::BadShape {
                    file: file.to_path_buf(),
                    got: s.len(),
                })
            }
        };
        if shape.contains(&0) {
            return Err(CubeError::EmptyAxis {
                file: file.to_path_buf(),
            });
        }
        trace!("TEC cube (time, freq, ant, y, x) dimensions: {dim:?}");

        let wcs = read_wcs(&mut fptr, &hdu, file)?;

        // The time and frequency descriptors come from the axes labelled as
        // such. Unlabelled cubes keep them on FITS axes 4 and 3.
        let mut time_axis = None;
        let mut freq_axis = None;
        for n in 3..=5 {
            let ctype: Option<String> =
                fits_get_optional_key(&mut fptr, &hdu, &format!("CTYPE{n}"))?;
            match ctype.as_deref().map(|c| c.trim().to_uppercase()) {
                Some(c) if c.starts_with("TIME") => time_axis = Some(n),
                Some(c) if c.starts_with("FREQ") => freq_axis = Some(n),
                _ => (),
            }
        }
        let time_axis = time_axis.unwrap_or(4);
        let freq_axis = freq_axis.unwrap_or(3);
        debug!("Using FITS axis {time_axis} for time and {freq_axis} for frequency");

        let time = (
            fits_get_required_key(&mut fptr, &hdu, &format!("CRVAL{time_axis}"))?,
            fits_get_required_key(&mut fptr, &hdu, &format!("CDELT{time_axis}"))?,
        );
        let freq = (
            fits_get_required_key(&mut fptr, &hdu, &format!("CRVAL{freq_axis}"))?,
            fits_get_required_key(&mut fptr, &hdu, &format!("CDELT{freq_axis}"))?,
        );

        let data: Vec<f64> = fits_get_image(&mut fptr, &hdu)?;
        let data = Array5::from_shape_vec(dim, data)?;
        Ok(TecCube::new(data, wcs, time, freq))
    }

    /// Get the integer (x, y) pixel of a sky coordinate, or `None` if it lies
    /// off the image.
    pub fn pixel(&self, radec: RADec) -> Option<(usize, usize)> {
        let (_, _, _, ny, nx) = self.data.dim();
        let (x, y) = self.wcs.world_to_pixel(radec)?;
        let (x, y) = (x.round(), y.round());
        if x < 0.0 || y < 0.0 || x >= nx as f64 || y >= ny as f64 {
            None
        } else {
            Some((x as usize, y as usize))
        }
    }

    /// Sample the cube toward each direction. Directions that land off the
    /// image are flagged for all times, antennas and frequencies.
    pub fn sample(
        &self,
        directions: &[SkyDirection],
        stations: &[Station],
    ) -> Result<TecValues, CubeError> {
        let (_, _, num_ants, _, _) = self.data.dim();
        if num_ants != stations.len() {
            return Err(CubeError::DimensionMismatch {
                cube: num_ants,
                stations: stations.len(),
            });
        }

        let axes = TecAxes {
            times: self.time.values(),
            antennas: stations.iter().map(|s| s.name.clone()).collect(),
            directions: directions.iter().map(|d| d.name.clone()).collect(),
            freqs: self.freq.values(),
        };
        let mut tec = TecValues::flagged(axes);

        for (i_dir, direction) in directions.iter().enumerate() {
            match self.pixel(direction.radec) {
                None => {
                    warn!(
                        "Direction '{}' is outside the TEC cube; flagging it",
                        direction.name
                    );
                }
                Some((x, y)) => {
                    trace!("Direction '{}' -> pixel ({x}, {y})", direction.name);
                    // (time, freq, ant) -> (time, ant, freq)
                    let pixel_tec = self.data.slice(s![.., .., .., y, x]);
                    tec.values
                        .slice_mut(s![.., .., i_dir, ..])
                        .assign(&pixel_tec.permuted_axes([0, 2, 1]));
                    tec.weights.slice_mut(s![.., .., i_dir, ..]).fill(1.0);
                }
            }
        }

        Ok(tec)
    }
}

fn read_wcs(fptr: &mut FitsFile, hdu: &FitsHdu, file: &Path) -> Result<Wcs, CubeError> {
    let wcs_err = |err: WcsError| CubeError::Wcs {
        file: file.to_path_buf(),
        err,
    };

    let ctype1: String = fits_get_required_key(fptr, hdu, "CTYPE1")?;
    let ctype2: String = fits_get_required_key(fptr, hdu, "CTYPE2")?;
    if !ctype1.trim().starts_with("RA") {
        return Err(wcs_err(WcsError::BadAxisType(ctype1)));
    }
    let projection = Projection::from_ctype(&ctype1).map_err(wcs_err)?;
    if Projection::from_ctype(&ctype2).map_err(wcs_err)? != projection {
        return Err(CubeError::MixedProjections {
            file: file.to_path_buf(),
            ra: ctype1,
            dec: ctype2,
        });
    }

    let reference = RADec::from_degrees(
        fits_get_required_key(fptr, hdu, "CRVAL1")?,
        fits_get_required_key(fptr, hdu, "CRVAL2")?,
    );
    let crpix = [
        fits_get_required_key(fptr, hdu, "CRPIX1")?,
        fits_get_required_key(fptr, hdu, "CRPIX2")?,
    ];

    let mut get_matrix = |prefix: &str| -> Result<Option<[[f64; 2]; 2]>, CubeError> {
        let mut m: [[Option<f64>; 2]; 2] = [[None; 2]; 2];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, elem) in row.iter_mut().enumerate() {
                let key = format!("{prefix}{}_{}", i + 1, j + 1);
                *elem = fits_get_optional_key(fptr, hdu, &key)?;
            }
        }
        if m.iter().flatten().all(Option::is_none) {
            return Ok(None);
        }
        // Missing off-diagonal elements are 0, missing diagonal elements are 1
        // for PC (and 0 for CD, which is then caught as a singular matrix).
        let diag = if prefix == "PC" { 1.0 } else { 0.0 };
        Ok(Some([
            [m[0][0].unwrap_or(diag), m[0][1].unwrap_or(0.0)],
            [m[1][0].unwrap_or(0.0), m[1][1].unwrap_or(diag)],
        ]))
    };

    let wcs = if let Some(cd) = get_matrix("CD")? {
        Wcs::new(projection, reference, crpix, cd)
    } else {
        let pc = get_matrix("PC")?;
        let cdelt = [
            fits_get_required_key(fptr, hdu, "CDELT1")?,
            fits_get_required_key(fptr, hdu, "CDELT2")?,
        ];
        match pc {
            Some(pc) => Wcs::from_pc(projection, reference, crpix, cdelt, pc),
            None => {
                let crota2 = fits_get_optional_key(fptr, hdu, "CROTA2")?.unwrap_or(0.0);
                Wcs::from_cdelt(projection, reference, crpix, cdelt, crota2)
            }
        }
    };
    wcs.map_err(wcs_err)
}
