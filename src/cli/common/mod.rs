// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code shared between `tecsim` subcommands.

mod printers;

pub(crate) use printers::{display_warnings, InfoPrinter, Warn};

use crate::{
    constants::{REFERENCE_HEIGHT_M, REFERENCE_LAT_DEG, REFERENCE_LONG_DEG},
    io::STRUCTURED_FILE_EXTENSIONS,
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *STRUCTURED_FILE_EXTENSIONS);

    pub(super) static ref PARAMETERS_HELP: String =
        format!("The parameter-set state of the prediction step. It is read if it exists, updated, then written back. Supported formats: {}", *STRUCTURED_FILE_EXTENSIONS);

    pub(super) static ref REFERENCE_POSITION_HELP: String =
        format!("The Earth longitude, latitude, and height of the geographic reference used for horizon coordinates and the wave's tangent plane [degrees, degrees, meters]. Default: ({REFERENCE_LONG_DEG}°, {REFERENCE_LAT_DEG}°, {REFERENCE_HEIGHT_M}m)");
}

/// Read an argument file (TOML or JSON, by extension) into the argument struct
/// of the calling subcommand. On failure, the calling function returns a
/// [`crate::TecsimError`].
macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read};

        use crate::io::{StructuredFileType, STRUCTURED_FILE_EXTENSIONS};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        match StructuredFileType::from_path(&$arg_file) {
            Some(StructuredFileType::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(TecsimError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(StructuredFileType::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(TecsimError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            None => {
                return Err(TecsimError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *STRUCTURED_FILE_EXTENSIONS)
                ))
            }
        }
    });
}
