// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use super::update_parameter_set;
use crate::parset::{apply_beam, BeamMode, ParameterSet, ParsetError};

/// Parameters needed to configure the station beam of the prediction step.
pub(crate) struct BeamParams {
    pub(crate) mode: BeamMode,
    pub(crate) use_channel_freq: bool,
    pub(crate) one_beam_per_patch: bool,

    /// The parameter-set state to update.
    pub(crate) parameters: PathBuf,
}

impl BeamParams {
    pub(crate) fn run(&self) -> Result<ParameterSet, ParsetError> {
        update_parameter_set(&self.parameters, |params| {
            apply_beam(
                params,
                self.mode,
                self.use_channel_freq,
                self.one_beam_per_patch,
            );
            Ok(())
        })
    }
}
