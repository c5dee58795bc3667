// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all tecsim-related errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use super::{beam::BeamArgsError, tec::TecArgsError};
use crate::{
    obs::ObservationError,
    params::TecRunError,
    parset::ParsetError,
    solutions::SolutionsWriteError,
    tec::{ConfigurationError, CubeError, WaveError},
};

/// The *only* publicly visible error from tecsim. Each error message should
/// point the user somewhere useful, unless it's "generic".
#[derive(Error, Debug)]
pub enum TecsimError {
    /// A problem with the requested configuration, e.g. an unknown TEC method
    /// or beam mode.
    #[error("{0}\n\nSee for more info: tecsim tec --help, tecsim beam --help")]
    Configuration(String),

    /// An error related to the observation description.
    #[error("{0}\n\nSee for more info: the 'tecsim::obs' module documentation")]
    Observation(String),

    /// An error related to TEC cubes.
    #[error("{0}\n\nTEC cubes must be 5-dimensional FITS images with axes (x, y, antenna, frequency, time) and a SIN or TAN celestial WCS.")]
    Cube(String),

    /// An error related to the wave model.
    #[error("{0}\n\nSee for more info: tecsim tec --help")]
    Wave(String),

    /// An error related to solution tables.
    #[error("{0}\n\nAny previously-written solution table at the output path is left untouched.")]
    Solutions(String),

    /// An error related to the prediction step's parameter set.
    #[error("{0}\n\nParameter sets are TOML or JSON maps of keys to values or lists of strings.")]
    Parset(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files take the same (long) argument names as the command line; see tecsim <subcommand> --help")]
    ArgFile(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv) and maybe disabling progress bars.")]
    Cfitsio(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

// Binary sub-command errors.

impl From<TecArgsError> for TecsimError {
    fn from(e: TecArgsError) -> Self {
        let s = e.to_string();
        match e {
            TecArgsError::NoObservation
            | TecArgsError::NoCube
            | TecArgsError::BadNumThreads
            | TecArgsError::BadReferencePosition(_) => Self::Configuration(s),
        }
    }
}

impl From<BeamArgsError> for TecsimError {
    fn from(e: BeamArgsError) -> Self {
        let s = e.to_string();
        match e {
            BeamArgsError::NoParameters => Self::Configuration(s),
            BeamArgsError::Parset(e) => Self::from(e),
        }
    }
}

impl From<TecRunError> for TecsimError {
    fn from(e: TecRunError) -> Self {
        match e {
            TecRunError::Cube(e) => Self::from(e),
            TecRunError::Wave(e) => Self::from(e),
            TecRunError::SolutionsWrite(e) => Self::from(e),
            TecRunError::Parset(e) => Self::from(e),
        }
    }
}

// Library code errors.

impl From<ConfigurationError> for TecsimError {
    fn from(e: ConfigurationError) -> Self {
        Self::Configuration(e.to_string())
    }
}

impl From<ObservationError> for TecsimError {
    fn from(e: ObservationError) -> Self {
        let s = e.to_string();
        match e {
            ObservationError::IO(_) => Self::Generic(s),
            _ => Self::Observation(s),
        }
    }
}

impl From<CubeError> for TecsimError {
    fn from(e: CubeError) -> Self {
        let s = e.to_string();
        match e {
            CubeError::BadShape { .. }
            | CubeError::EmptyAxis { .. }
            | CubeError::DimensionMismatch { .. }
            | CubeError::Wcs { .. }
            | CubeError::MixedProjections { .. }
            | CubeError::Shape(_) => Self::Cube(s),
            CubeError::Fits(_) => Self::Cfitsio(s),
        }
    }
}

impl From<WaveError> for TecsimError {
    fn from(e: WaveError) -> Self {
        let s = e.to_string();
        match e {
            WaveError::NoTimestamps | WaveError::NoFreqs => Self::Observation(s),
            WaveError::BadParam { .. } | WaveError::NoPiercePoint { .. } => Self::Wave(s),
            WaveError::ThreadPool(_) => Self::Generic(s),
        }
    }
}

impl From<SolutionsWriteError> for TecsimError {
    fn from(e: SolutionsWriteError) -> Self {
        let s = e.to_string();
        match e {
            SolutionsWriteError::Inconsistent { .. } | SolutionsWriteError::BadSoltabName(_) => {
                Self::Solutions(s)
            }
            SolutionsWriteError::Fitsio(_) | SolutionsWriteError::Fits(_) => Self::Cfitsio(s),
            SolutionsWriteError::IO(_) => Self::Solutions(s),
        }
    }
}

impl From<ParsetError> for TecsimError {
    fn from(e: ParsetError) -> Self {
        let s = e.to_string();
        match e {
            ParsetError::UnknownBeamMode { .. } => Self::Configuration(s),
            ParsetError::NotAList { .. }
            | ParsetError::UnknownExtension { .. }
            | ParsetError::TomlDecode { .. }
            | ParsetError::TomlEncode(_)
            | ParsetError::Json { .. }
            | ParsetError::JsonEncode(_) => Self::Parset(s),
            ParsetError::IO(_) => Self::Generic(s),
        }
    }
}

impl From<std::io::Error> for TecsimError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
