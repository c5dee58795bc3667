// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Generate ionospheric total-electron-content (TEC) solution tables for
radio-interferometer visibility simulations.

TEC values are either resampled from a pre-measured TEC cube (FITS), or
synthesised from a travelling ionospheric disturbance (TID) model. The
resulting table is written to disk and the simulation parameter set is updated
so that a downstream prediction step applies it.
 */

mod cli;
pub mod constants;
pub mod coord;
pub(crate) mod io;
pub mod obs;
pub(crate) mod params;
pub mod parset;
pub mod solutions;
pub mod tec;

// Re-exports.
pub use cli::{Tecsim, TecsimError};
pub use obs::{Observation, SkyDirection, Station};
pub use parset::{ParameterSet, ParsetValue};
pub use solutions::SolutionTable;
pub use tec::{TecAxes, TecMethod, TecValues, WaveParams};

use crossbeam_utils::atomic::AtomicCell;

/// Should progress bars be drawn? This is set by the CLI.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
