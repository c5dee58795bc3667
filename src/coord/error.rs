// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with coordinate projections.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WcsError {
    #[error("Unsupported sky projection '{0}'; supported projections are SIN and TAN")]
    UnsupportedProjection(String),

    #[error("Expected a celestial axis type like 'RA---SIN' or 'DEC--TAN', but got '{0}'")]
    BadAxisType(String),

    #[error("The WCS pixel-to-world matrix is singular (determinant {det})")]
    SingularMatrix { det: f64 },
}
