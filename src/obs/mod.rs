// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The observation context: which stations observe which sky directions, when,
//! and at which frequencies.
//!
//! Observations are described by a TOML or JSON file, e.g.
//!
//! ```toml
//! freqs_hz = [120e6, 130e6]
//!
//! [time]
//! start_mjd_s = 5.0e9
//! resolution_s = 10.0
//! num_timesteps = 4
//!
//! [[station]]
//! name = "CS001"
//! position = [3826923.5, 460915.4, 5064643.5]
//!
//! [[direction]]
//! name = "3C196"
//! ra = 123.4
//! dec = 48.2
//! ```

mod error;
#[cfg(test)]
mod tests;

pub use error::ObservationError;

use std::{collections::HashSet, path::Path};

use hifitime::{Duration, Epoch};
use itertools::Itertools;
use log::debug;
use marlu::{RADec, XyzGeocentric};
use serde::Deserialize;
use vec1::Vec1;

use crate::{
    constants::DAYSEC,
    io::{StructuredFileType, STRUCTURED_FILE_EXTENSIONS},
};

/// An antenna station. Its position is geocentric (ITRF) \[metres\].
#[derive(Debug, Clone)]
pub struct Station {
    pub name: String,
    pub position: XyzGeocentric,
}

/// A named direction on the sky (J2000).
#[derive(Debug, Clone)]
pub struct SkyDirection {
    pub name: String,
    pub radec: RADec,
}

#[derive(Debug)]
pub struct Observation {
    /// The stations, in their canonical order.
    pub stations: Vec1<Station>,

    /// The sky directions, in their canonical order.
    pub directions: Vec1<SkyDirection>,

    /// The observation's timestamps, in chronological order. Not all methods
    /// need these.
    pub timestamps: Option<Vec1<Epoch>>,

    /// The observation's channel frequencies \[Hz\].
    pub freqs: Option<Vec1<f64>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ObservationFile {
    #[serde(default)]
    station: Vec<StationFile>,
    #[serde(default)]
    direction: Vec<DirectionFile>,
    time: Option<TimeFile>,
    freqs_hz: Option<Vec<f64>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StationFile {
    name: String,
    position: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectionFile {
    name: String,
    /// \[degrees\]
    ra: f64,
    /// \[degrees\]
    dec: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeFile {
    start_mjd_s: f64,
    resolution_s: f64,
    num_timesteps: usize,
}

impl Observation {
    /// Build a new [`Observation`], checking that names are unique and values
    /// are sensible.
    pub fn new(
        stations: Vec<Station>,
        directions: Vec<SkyDirection>,
        timestamps: Option<Vec<Epoch>>,
        freqs: Option<Vec<f64>>,
    ) -> Result<Observation, ObservationError> {
        let stations =
            Vec1::try_from_vec(stations).map_err(|_| ObservationError::Empty("stations"))?;
        let directions =
            Vec1::try_from_vec(directions).map_err(|_| ObservationError::Empty("directions"))?;
        check_names("station", stations.iter().map(|s| s.name.as_str()))?;
        check_names("direction", directions.iter().map(|d| d.name.as_str()))?;

        if stations.iter().any(|s| {
            let XyzGeocentric { x, y, z } = s.position;
            !(x.is_finite() && y.is_finite() && z.is_finite())
        }) {
            return Err(ObservationError::NonFinite("station position"));
        }
        if directions
            .iter()
            .any(|d| !(d.radec.ra.is_finite() && d.radec.dec.is_finite()))
        {
            return Err(ObservationError::NonFinite("direction"));
        }

        let timestamps = match timestamps {
            None => None,
            Some(t) => {
                if let Some((prev_index, (prev, this))) = t
                    .iter()
                    .tuple_windows()
                    .find_position(|(prev, this)| this <= prev)
                {
                    return Err(ObservationError::UnorderedTimestamps {
                        index: prev_index + 1,
                        prev_index,
                        this: *this,
                        prev: *prev,
                    });
                }
                Some(Vec1::try_from_vec(t).map_err(|_| ObservationError::NoTimesteps)?)
            }
        };
        let freqs = match freqs {
            None => None,
            Some(f) => {
                if f.iter().any(|f| !f.is_finite()) {
                    return Err(ObservationError::NonFinite("frequency"));
                }
                Some(Vec1::try_from_vec(f).map_err(|_| ObservationError::Empty("frequencies"))?)
            }
        };

        Ok(Observation {
            stations,
            directions,
            timestamps,
            freqs,
        })
    }

    /// Read an observation description from a TOML or JSON file.
    pub fn read(file: &Path) -> Result<Observation, ObservationError> {
        debug!("Reading observation description from {}", file.display());
        if !file.exists() {
            return Err(ObservationError::DoesntExist(file.to_path_buf()));
        }
        let file_type = StructuredFileType::from_path(file).ok_or_else(|| {
            ObservationError::UnknownExtension {
                file: file.to_path_buf(),
                exts: STRUCTURED_FILE_EXTENSIONS.clone(),
            }
        })?;
        let contents = std::fs::read_to_string(file)?;
        let parsed: ObservationFile = match file_type {
            StructuredFileType::Toml => {
                toml::from_str(&contents).map_err(|err| ObservationError::Toml {
                    file: file.to_path_buf(),
                    err,
                })?
            }
            StructuredFileType::Json => {
                serde_json::from_str(&contents).map_err(|err| ObservationError::Json {
                    file: file.to_path_buf(),
                    err,
                })?
            }
        };
        Observation::try_from(parsed)
    }

    /// The timestamps as MJD seconds (UTC).
    #[cfg(test)]
    pub(crate) fn times_mjd_s(&self) -> Option<Vec<f64>> {
        self.timestamps
            .as_ref()
            .map(|t| t.iter().map(|e| e.to_mjd_utc_seconds()).collect())
    }
}

impl TryFrom<ObservationFile> for Observation {
    type Error = ObservationError;

    fn try_from(file: ObservationFile) -> Result<Observation, ObservationError> {
        let stations = file
            .station
            .into_iter()
            .map(|StationFile { name, position }| match position.as_slice() {
                &[x, y, z] => Ok(Station {
                    name,
                    position: XyzGeocentric { x, y, z },
                }),
                p => Err(ObservationError::BadPosition {
                    len: p.len(),
                    name,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let directions = file
            .direction
            .into_iter()
            .map(|DirectionFile { name, ra, dec }| SkyDirection {
                name,
                radec: RADec::from_degrees(ra, dec),
            })
            .collect();
        let timestamps = match file.time {
            None => None,
            Some(TimeFile {
                start_mjd_s,
                resolution_s,
                num_timesteps,
            }) => {
                if num_timesteps == 0 {
                    return Err(ObservationError::NoTimesteps);
                }
                if !(resolution_s > 0.0 && resolution_s.is_finite()) {
                    return Err(ObservationError::BadTimeRes(resolution_s));
                }
                if !start_mjd_s.is_finite() {
                    return Err(ObservationError::NonFinite("start time"));
                }
                let start = Epoch::from_mjd_utc(start_mjd_s / DAYSEC);
                let res = Duration::from_seconds(resolution_s);
                Some((0..num_timesteps).map(|i| start + res * i as i64).collect())
            }
        };
        Observation::new(stations, directions, timestamps, file.freqs_hz)
    }
}

/// Names must be unique, and must survive being stored in a fixed-width FITS
/// column, which pads with (and so drops trailing) spaces.
fn check_names<'a>(
    thing: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ObservationError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() || name.trim() != name {
            return Err(ObservationError::BadName {
                thing,
                name: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(ObservationError::DuplicateName {
                thing,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
