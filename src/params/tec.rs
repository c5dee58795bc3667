// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generate a TEC solution table and point the prediction step at it.

use std::path::PathBuf;

use log::{debug, info};
use thiserror::Error;

use super::update_parameter_set;
use crate::{
    obs::Observation,
    parset::{apply_tec, ParsetError},
    solutions::{persist, SolutionTable, SolutionsWriteError, TecSource},
    tec::{synthesize, CubeError, TecCube, TecMethod, TecValues, WaveError, WaveParams},
};

/// Where TEC values come from.
pub(crate) enum TecGenerator {
    /// A TEC cube, and the file it was read from.
    Cube { cube: TecCube, file: PathBuf },

    Wave(WaveParams),
}

impl TecGenerator {
    pub(crate) fn method(&self) -> TecMethod {
        match self {
            TecGenerator::Cube { .. } => TecMethod::FitsCube,
            TecGenerator::Wave(_) => TecMethod::Wave,
        }
    }

    pub(crate) fn source(&self) -> TecSource {
        match self {
            TecGenerator::Cube { file, .. } => TecSource::Cube(file.clone()),
            TecGenerator::Wave(_) => TecSource::Wave,
        }
    }
}

/// Parameters needed to generate a TEC solution table.
pub(crate) struct TecParams {
    pub(crate) observation: Observation,

    pub(crate) generator: TecGenerator,

    /// The solution table to be written.
    pub(crate) output: PathBuf,

    /// The name of the correction (and of the solution table inside the
    /// output file).
    pub(crate) correction: String,

    /// The parameter-set state to update. If this is `None`, no parameters
    /// are changed.
    pub(crate) parameters: Option<PathBuf>,
}

impl TecParams {
    /// Generate TEC values, persist them, then tell the prediction step to
    /// apply them. Nothing is written if the values can't be generated.
    pub(crate) fn run(&self) -> Result<SolutionTable, TecRunError> {
        let TecParams {
            observation,
            generator,
            output,
            correction,
            parameters,
        } = self;

        let tec = self.generate()?;
        debug!(
            "Generated TEC with dimensions (time, ant, dir, freq) {:?}",
            tec.values.dim()
        );

        let table = persist(
            output,
            tec,
            &observation.stations,
            &observation.directions,
            correction,
            &generator.source(),
        )?;
        info!("Wrote TEC solution table {}", output.display());

        if let Some(parameters) = parameters {
            update_parameter_set(parameters, |params| {
                apply_tec(params, output, correction)
            })?;
        }

        Ok(table)
    }

    fn generate(&self) -> Result<TecValues, TecRunError> {
        let Observation {
            stations,
            directions,
            timestamps,
            freqs,
        } = &self.observation;

        match &self.generator {
            TecGenerator::Cube { cube, .. } => Ok(cube.sample(directions, stations)?),

            TecGenerator::Wave(wave_params) => {
                let timestamps = timestamps.as_ref().ok_or(WaveError::NoTimestamps)?;
                let freqs = freqs.as_ref().ok_or(WaveError::NoFreqs)?;
                Ok(synthesize(
                    directions,
                    stations,
                    timestamps,
                    freqs,
                    wave_params,
                )?)
            }
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum TecRunError {
    #[error(transparent)]
    Cube(#[from] CubeError),

    #[error(transparent)]
    Wave(#[from] WaveError),

    #[error(transparent)]
    SolutionsWrite(#[from] SolutionsWriteError),

    #[error(transparent)]
    Parset(#[from] ParsetError),
}
