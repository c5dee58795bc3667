// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A minimal celestial world-coordinate system (WCS) for zenithal projections.
//!
//! Only the SIN and TAN projections with the native pole at the reference point
//! are supported; this covers TEC screens and images made by interferometric
//! imagers. See Calabretta & Greisen (2002), "Representations of celestial
//! coordinates in FITS", for the definitions used here.

use std::str::FromStr;

use marlu::RADec;
use strum_macros::{Display, EnumString};

use super::WcsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Projection {
    /// Slant orthographic.
    #[strum(serialize = "SIN")]
    Sin,

    /// Gnomonic.
    #[strum(serialize = "TAN")]
    Tan,
}

impl Projection {
    /// Get the projection out of a FITS `CTYPE` value, e.g. "RA---SIN".
    pub fn from_ctype(ctype: &str) -> Result<Projection, WcsError> {
        let ctype = ctype.trim();
        if ctype.len() != 8 || !(ctype.starts_with("RA--") || ctype.starts_with("DEC-")) {
            return Err(WcsError::BadAxisType(ctype.to_string()));
        }
        let code = &ctype[5..];
        Projection::from_str(code).map_err(|_| WcsError::UnsupportedProjection(code.to_string()))
    }
}

/// Converts between sky coordinates and image pixels.
#[derive(Debug, Clone)]
pub struct Wcs {
    pub projection: Projection,

    /// The sky coordinate of the reference pixel (CRVAL1, CRVAL2).
    pub reference: RADec,

    /// The reference pixel (CRPIX1, CRPIX2). This is 1-based, like FITS.
    pub crpix: [f64; 2],

    /// The linear transformation from pixel offsets to intermediate world
    /// coordinates \[degrees\].
    pub cd: [[f64; 2]; 2],

    inv_cd: [[f64; 2]; 2],
}

impl Wcs {
    /// Make a new [`Wcs`] from a CD matrix (`CDi_j` keywords).
    pub fn new(
        projection: Projection,
        reference: RADec,
        crpix: [f64; 2],
        cd: [[f64; 2]; 2],
    ) -> Result<Wcs, WcsError> {
        let det = cd[0][0] * cd[1][1] - cd[0][1] * cd[1][0];
        if det == 0.0 || !det.is_finite() {
            return Err(WcsError::SingularMatrix { det });
        }
        let inv_cd = [
            [cd[1][1] / det, -cd[0][1] / det],
            [-cd[1][0] / det, cd[0][0] / det],
        ];
        Ok(Wcs {
            projection,
            reference,
            crpix,
            cd,
            inv_cd,
        })
    }

    /// Make a new [`Wcs`] from `PCi_j` and `CDELTi` keywords.
    pub fn from_pc(
        projection: Projection,
        reference: RADec,
        crpix: [f64; 2],
        cdelt: [f64; 2],
        pc: [[f64; 2]; 2],
    ) -> Result<Wcs, WcsError> {
        let cd = [
            [cdelt[0] * pc[0][0], cdelt[0] * pc[0][1]],
            [cdelt[1] * pc[1][0], cdelt[1] * pc[1][1]],
        ];
        Self::new(projection, reference, crpix, cd)
    }

    /// Make a new [`Wcs`] from `CDELTi` and the (old-fashioned) `CROTA2`
    /// keywords. The rotation is in degrees.
    pub fn from_cdelt(
        projection: Projection,
        reference: RADec,
        crpix: [f64; 2],
        cdelt: [f64; 2],
        crota2_deg: f64,
    ) -> Result<Wcs, WcsError> {
        let (s, c) = crota2_deg.to_radians().sin_cos();
        let cd = [
            [cdelt[0] * c, -cdelt[1] * s],
            [cdelt[0] * s, cdelt[1] * c],
        ];
        Self::new(projection, reference, crpix, cd)
    }

    /// Project a sky coordinate onto the image, returning fractional, 0-based
    /// (x, y) pixel coordinates. `None` is returned if the coordinate cannot be
    /// represented by the projection (i.e. it is on the far side of the sky).
    pub fn world_to_pixel(&self, radec: RADec) -> Option<(f64, f64)> {
        let lmn = radec.to_lmn(self.reference);
        let (x, y) = match self.projection {
            Projection::Sin => {
                if lmn.n < 0.0 {
                    return None;
                }
                (lmn.l, lmn.m)
            }
            Projection::Tan => {
                if lmn.n <= 0.0 {
                    return None;
                }
                (lmn.l / lmn.n, lmn.m / lmn.n)
            }
        };
        let (x, y) = (x.to_degrees(), y.to_degrees());

        let [[a, b], [c, d]] = self.inv_cd;
        let px = a * x + b * y + self.crpix[0] - 1.0;
        let py = c * x + d * y + self.crpix[1] - 1.0;
        if px.is_finite() && py.is_finite() {
            Some((px, py))
        } else {
            None
        }
    }

    /// The inverse of [`Wcs::world_to_pixel`].
    #[cfg(test)]
    pub(crate) fn pixel_to_world(&self, px: f64, py: f64) -> Option<RADec> {
        let (dx, dy) = (px + 1.0 - self.crpix[0], py + 1.0 - self.crpix[1]);
        let [[a, b], [c, d]] = self.cd;
        let x = (a * dx + b * dy).to_radians();
        let y = (c * dx + d * dy).to_radians();

        let (l, m, n) = match self.projection {
            Projection::Sin => {
                let r2 = x * x + y * y;
                if r2 > 1.0 {
                    return None;
                }
                (x, y, (1.0 - r2).sqrt())
            }
            Projection::Tan => {
                let norm = (x * x + y * y + 1.0).sqrt();
                (x / norm, y / norm, 1.0 / norm)
            }
        };

        let (s_dec0, c_dec0) = self.reference.dec.sin_cos();
        let dec = (m * c_dec0 + n * s_dec0).clamp(-1.0, 1.0).asin();
        let ra = self.reference.ra + l.atan2(n * c_dec0 - m * s_dec0);
        Some(RADec::from_radians(ra.rem_euclid(std::f64::consts::TAU), dec))
    }
}
