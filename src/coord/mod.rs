// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Coordinate handling: sky-to-pixel projections for TEC cubes, and the
//! geometry of a thin-shell ionosphere.

mod error;
mod geometry;
mod wcs;

pub use error::WcsError;
pub use geometry::{azel_to_geocentric_direction, get_piercing_point, PiercePoint};
pub use wcs::{Projection, Wcs};
