// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading observation descriptions.

use std::path::PathBuf;

use hifitime::Epoch;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservationError {
    #[error("Observation file '{0}' doesn't exist")]
    DoesntExist(PathBuf),

    #[error("Observation file '{file}' doesn't have a recognised file extension! Valid extensions are: {exts}")]
    UnknownExtension { file: PathBuf, exts: String },

    #[error("Couldn't decode toml structure from '{file}':\n{err}")]
    Toml { file: PathBuf, err: toml::de::Error },

    #[error("Couldn't decode json structure from '{file}':\n{err}")]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error("The observation has no {0}")]
    Empty(&'static str),

    #[error("The {thing} name '{name}' appears more than once")]
    DuplicateName { thing: &'static str, name: String },

    #[error("The {thing} name {name:?} is empty or starts or ends with whitespace")]
    BadName { thing: &'static str, name: String },

    #[error("Station '{name}' has a position with {len} elements; expected 3 (X, Y, Z)")]
    BadPosition { name: String, len: usize },

    #[error("The observation's number of timesteps must be at least 1")]
    NoTimesteps,

    #[error("The observation's time resolution must be positive, but got {0} s")]
    BadTimeRes(f64),

    #[error("The observation's timestamps must increase, but timestep {index} ({this}) is not after timestep {prev_index} ({prev})")]
    UnorderedTimestamps {
        index: usize,
        prev_index: usize,
        this: Epoch,
        prev: Epoch,
    },

    #[error("The observation's {0} values must be finite")]
    NonFinite(&'static str),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
