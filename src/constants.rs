// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Distances are in metres and angles in
degrees unless stated otherwise.
 */

pub use std::f64::consts::TAU;

/// The default height of the thin ionospheric shell above the Earth's surface
/// \[metres\].
pub const DEFAULT_SHELL_HEIGHT_M: f64 = 200e3;

/// The radius of the spherical Earth used when finding ionospheric piercing
/// points \[metres\].
pub const EARTH_RADIUS_M: f64 = 6364.62e3;

/// The default amplitude of the travelling ionospheric disturbance \[TECU\].
pub const DEFAULT_TID_AMPLITUDE: f64 = 1.0;

/// The default speed of the travelling ionospheric disturbance \[km/h\].
pub const DEFAULT_TID_VELOCITY_KMH: f64 = 500.0;

/// The default wavelength of the travelling ionospheric disturbance \[km\].
pub const DEFAULT_TID_WAVELENGTH_KM: f64 = 200.0;

/// The default azimuth of the axis along which the travelling ionospheric
/// disturbance propagates \[degrees, North through East\].
pub const DEFAULT_TID_AZIMUTH_DEG: f64 = 0.0;

/// The default geographic reference location (LOFAR superterp-ish, as used for
/// the original TID simulations).
pub const REFERENCE_LONG_DEG: f64 = 6.87;
pub const REFERENCE_LAT_DEG: f64 = 52.91;
pub const REFERENCE_HEIGHT_M: f64 = 1.0;

/// The default number of worker threads used when synthesising TEC from the
/// wave model.
pub const DEFAULT_NUM_THREADS: usize = 16;

/// The name of the solution set written to solution tables.
pub const SOLSET_NAME: &str = "sol000";

/// The type of the solution table written.
pub const SOLTAB_TYPE: &str = "tec";

/// The default name of the correction (solution table) that the prediction step
/// is told to apply.
pub const DEFAULT_CORRECTION_NAME: &str = "tec000";

/// Weight given to flagged entries. Flagged entries also get a neutral value of
/// [`FLAGGED_VALUE`].
pub const FLAGGED_WEIGHT: f64 = 0.0;

/// The value written for directions without data.
pub const FLAGGED_VALUE: f64 = 1.0;

/// The number of seconds in a day.
pub const DAYSEC: f64 = 86400.0;
