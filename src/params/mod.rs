// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters that are ready to be run.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters have
//! been parsed and validated and are ready to be used directly.

mod beam;
mod tec;

pub(crate) use beam::BeamParams;
pub(crate) use tec::{TecGenerator, TecParams, TecRunError};

use std::path::Path;

use log::{debug, info};

use crate::parset::{ParameterSet, ParsetError};

/// Load the parameter-set state in `file` if it exists, otherwise start with
/// an empty set.
fn load_parameter_set(file: &Path) -> Result<ParameterSet, ParsetError> {
    if file.exists() {
        ParameterSet::read(file)
    } else {
        info!(
            "Parameter set {} doesn't exist yet; starting a new one",
            file.display()
        );
        Ok(ParameterSet::new())
    }
}

/// Apply `update` to the parameter set stored in `file`, then write it back.
fn update_parameter_set<F>(file: &Path, update: F) -> Result<ParameterSet, ParsetError>
where
    F: FnOnce(&mut ParameterSet) -> Result<(), ParsetError>,
{
    let mut params = load_parameter_set(file)?;
    update(&mut params)?;
    debug!("Parameter set now has {} keys", params.len());
    params.write(file)?;
    info!("Updated parameter set {}", file.display());
    Ok(params)
}
