// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with parameter sets.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParsetError {
    #[error("Can't append '{item}' to parameter '{key}'; it holds {value}, which is not a list")]
    NotAList {
        key: String,
        item: String,
        value: String,
    },

    #[error("Beam mode '{got}' not understood; valid modes are: {valid}")]
    UnknownBeamMode { got: String, valid: String },

    #[error("Parameter set file '{file}' doesn't have a recognised file extension! Valid extensions are: {exts}")]
    UnknownExtension { file: PathBuf, exts: String },

    #[error("Couldn't decode toml structure from '{file}':\n{err}")]
    TomlDecode { file: PathBuf, err: toml::de::Error },

    #[error("Couldn't encode the parameter set as toml: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Couldn't decode json structure from '{file}':\n{err}")]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error("Couldn't encode the parameter set as json: {0}")]
    JsonEncode(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
