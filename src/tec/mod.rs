// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generating TEC values over (time, antenna, direction, frequency).
//!
//! Values come either from sampling a pre-computed TEC cube ([`TecCube`]) or
//! from a travelling ionospheric disturbance model ([`synthesize`]).

mod cube;
mod error;
mod wave;

pub use cube::{LinearAxis, TecCube};
pub use error::{ConfigurationError, CubeError, WaveError};
pub use wave::{synthesize, WaveParams};

use std::str::FromStr;

use itertools::Itertools;
use ndarray::prelude::*;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::{FLAGGED_VALUE, FLAGGED_WEIGHT};

/// How TEC values are generated.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq)]
pub enum TecMethod {
    /// Sample a TEC cube at each direction's pixel.
    #[strum(serialize = "fits", serialize = "fits-cube", to_string = "fits")]
    FitsCube,

    /// Evaluate a travelling ionospheric disturbance along each line of sight.
    #[strum(serialize = "wave", serialize = "tid", to_string = "wave")]
    Wave,
}

lazy_static::lazy_static! {
    pub(crate) static ref TEC_METHODS: String = TecMethod::iter().join(", ");
}

impl TecMethod {
    pub fn parse(s: &str) -> Result<TecMethod, ConfigurationError> {
        TecMethod::from_str(&s.trim().to_lowercase()).map_err(|_| {
            ConfigurationError::UnknownMethod {
                got: s.to_string(),
                valid: TEC_METHODS.clone(),
            }
        })
    }
}

/// The axes of a TEC solution table.
#[derive(Debug, Clone, PartialEq)]
pub struct TecAxes {
    /// \[MJD seconds, UTC\]
    pub times: Vec<f64>,
    pub antennas: Vec<String>,
    pub directions: Vec<String>,
    /// \[Hz\]
    pub freqs: Vec<f64>,
}

impl TecAxes {
    /// The shape of the arrays described by these axes.
    pub fn dim(&self) -> (usize, usize, usize, usize) {
        (
            self.times.len(),
            self.antennas.len(),
            self.directions.len(),
            self.freqs.len(),
        )
    }
}

/// TEC values and their weights, with dimensions (time, antenna, direction,
/// frequency). A weight of 0 means "no data"; those values must not be
/// applied.
#[derive(Debug, Clone)]
pub struct TecValues {
    pub values: Array4<f64>,
    pub weights: Array4<f64>,
    pub axes: TecAxes,
}

impl TecValues {
    /// Make new values and weights filled with flags, i.e. "no data anywhere".
    pub(crate) fn flagged(axes: TecAxes) -> TecValues {
        let dim = axes.dim();
        TecValues {
            values: Array4::from_elem(dim, FLAGGED_VALUE),
            weights: Array4::from_elem(dim, FLAGGED_WEIGHT),
            axes,
        }
    }

    /// Do the arrays agree with each other and with the axes?
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.values.dim() == self.weights.dim() && self.values.dim() == self.axes.dim()
    }
}
