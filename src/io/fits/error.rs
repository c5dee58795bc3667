// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading and writing FITS files.

use std::{fmt::Display, path::Path};

use thiserror::Error;

/// The place in this crate that asked for a FITS operation; reported alongside
/// cfitsio errors because those are otherwise hard to place.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    file: &'static str,
    line: u32,
    column: u32,
}

impl Caller {
    #[track_caller]
    pub(crate) fn here() -> Caller {
        let caller = std::panic::Location::caller();
        Caller {
            file: caller.file(),
            line: caller.line(),
            column: caller.column(),
        }
    }
}

impl Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Error, Debug)]
pub enum FitsError {
    /// Error when opening a fits file.
    #[error("{caller}: Couldn't open {fits_filename}: {fits_error}")]
    Open {
        fits_error: Box<fitsio::errors::Error>,
        fits_filename: Box<Path>,
        caller: Caller,
    },

    /// Error describing a key that couldn't be found in a fits header.
    #[error("{caller}: {fits_filename} HDU {hdu_num}: Couldn't find key {key}")]
    MissingKey {
        key: Box<str>,
        fits_filename: Box<Path>,
        hdu_num: usize,
        caller: Caller,
    },

    /// Error describing a HDU that couldn't be used as an image.
    #[error("{caller}: {fits_filename} HDU {hdu_num}: Tried to use as an image, but not an image")]
    NotImage {
        fits_filename: Box<Path>,
        hdu_num: usize,
        caller: Caller,
    },

    /// Failure to read or write a long string.
    #[error("{caller}: {fits_filename}: cfitsio status {status} when handling long string key {key}")]
    LongString {
        key: Box<str>,
        fits_filename: Box<Path>,
        status: i32,
        caller: Caller,
    },

    /// A string destined for cfitsio contained a NUL byte.
    #[error("{caller}: Couldn't pass '{string}' to cfitsio; it contains a NUL byte")]
    Nul { string: Box<str>, caller: Caller },

    /// A generic error associated with the fitsio crate.
    #[error("{caller}: {fits_filename} HDU '{hdu_description}': {fits_error}")]
    Fitsio {
        fits_error: Box<fitsio::errors::Error>,
        fits_filename: Box<Path>,
        hdu_description: Box<str>,
        caller: Caller,
    },

    /// An error associated with parsing a string into another type.
    #[error("{caller}: Couldn't parse {key} = '{value}' in {fits_filename} HDU {hdu_num}")]
    Parse {
        key: Box<str>,
        value: Box<str>,
        fits_filename: Box<Path>,
        hdu_num: usize,
        caller: Caller,
    },
}
