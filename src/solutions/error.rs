// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading or writing TEC solution tables.

use thiserror::Error;

use crate::io::fits::FitsError;

#[derive(Error, Debug)]
pub enum SolutionsReadError {
    #[error("The solution table image has {got} dimensions; expected 4 (time, ant, dir, freq)")]
    BadDimensions { got: usize },

    #[error("Based on the dimensions of the solutions, expected {thing} to have {expected} elements, but it had {actual} instead!")]
    BadShape {
        /// What was it that wasn't sensible? The time axis, antenna table,
        /// etc.
        thing: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Expected a solution table of type '{expected}', but got '{got}'")]
    WrongType { expected: &'static str, got: String },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Fitsio(#[from] fitsio::errors::Error),
}

#[derive(Error, Debug)]
pub enum SolutionsWriteError {
    #[error("Refusing to write an inconsistent solution table: expected {thing} to have {expected} elements, but it had {actual}")]
    Inconsistent {
        thing: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Solution table names must be valid FITS extension names; got '{0}'")]
    BadSoltabName(String),

    #[error(transparent)]
    Fitsio(#[from] fitsio::errors::Error),

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
