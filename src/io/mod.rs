// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff: FITS helpers, and detecting the type of structured text files
//! (observation descriptions, parameter sets and argument files).

pub(crate) mod fits;

use std::{path::Path, str::FromStr};

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StructuredFileType {
    #[strum(serialize = "toml")]
    Toml,

    #[strum(serialize = "json")]
    Json,
}

lazy_static::lazy_static! {
    pub(crate) static ref STRUCTURED_FILE_EXTENSIONS: String = StructuredFileType::iter().join(", ");
}

impl StructuredFileType {
    /// Work out the type of a file from its extension (case insensitive).
    pub(crate) fn from_path(path: &Path) -> Option<StructuredFileType> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| StructuredFileType::from_str(&e.to_lowercase()).ok())
    }
}
