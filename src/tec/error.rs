// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with generating TEC values.

use std::path::PathBuf;

use thiserror::Error;

use crate::{coord::WcsError, io::fits::FitsError};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Unrecognised TEC method '{got}'; valid methods are: {valid}")]
    UnknownMethod { got: String, valid: String },
}

#[derive(Error, Debug)]
pub enum CubeError {
    #[error("TEC cube '{file}' has {got} dimensions; expected 5 (time, frequency, antenna, y, x)")]
    BadShape { file: PathBuf, got: usize },

    #[error("TEC cube '{file}' has an axis of length 0")]
    EmptyAxis { file: PathBuf },

    #[error("The TEC cube has {cube} antennas, but the observation has {stations} stations")]
    DimensionMismatch { cube: usize, stations: usize },

    #[error("TEC cube '{file}': {err}")]
    Wcs { file: PathBuf, err: WcsError },

    #[error("TEC cube '{file}': the RA and Dec axes use different projections ({ra} vs. {dec})")]
    MixedProjections {
        file: PathBuf,
        ra: String,
        dec: String,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Fits(#[from] FitsError),
}

#[derive(Error, Debug)]
pub enum WaveError {
    #[error("The observation has no timestamps; the wave method needs a time axis")]
    NoTimestamps,

    #[error("The observation has no frequencies; the wave method needs a frequency axis")]
    NoFreqs,

    #[error("The TID {param} must be {requirement}, but got {value}")]
    BadParam {
        param: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("The line of sight from station '{station}' toward direction '{direction}' at timestep {timestep} never reaches the ionospheric shell")]
    NoPiercePoint {
        station: String,
        direction: String,
        timestep: usize,
    },

    #[error("Couldn't build the worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
