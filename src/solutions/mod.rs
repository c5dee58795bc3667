// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! TEC solution tables: the TEC values, their weights and axes, the antenna
//! and direction side tables, and a provenance history.
//!
//! Tables are written as FITS files with a single solution set. The layout is
//! documented in [`fits`].

mod error;
pub(crate) mod fits;
#[cfg(test)]
mod tests;

pub use error::{SolutionsReadError, SolutionsWriteError};
pub(crate) use fits::check_soltab_name;

use std::path::{Path, PathBuf};

use log::debug;

use crate::{
    constants::{DEFAULT_CORRECTION_NAME, SOLSET_NAME},
    obs::{SkyDirection, Station},
    tec::TecValues,
};

/// Where the TEC values of a table came from.
#[derive(Debug, Clone, PartialEq)]
pub enum TecSource {
    Cube(PathBuf),
    Wave,
}

impl std::fmt::Display for TecSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TecSource::Cube(file) => write!(f, "FITS cube {}", file.display()),
            TecSource::Wave => write!(f, "wave"),
        }
    }
}

/// The history entry recorded when a table is created.
pub fn creation_entry(output: &Path, source: &TecSource) -> String {
    format!(
        "CREATE (by TEC operation of {} from obs {} and {source})",
        env!("CARGO_PKG_NAME"),
        output.display()
    )
}

#[derive(Debug, Clone)]
pub struct SolutionTable {
    /// The name of the solution set. This is always "sol000" when written by
    /// this crate.
    pub solset: String,

    /// The name of the solution table, e.g. "tec000". Prediction steps refer
    /// to the table by this name.
    pub soltab: String,

    pub tec: TecValues,

    /// The antenna side table, in the same order as the antenna axis.
    pub antennas: Vec<Station>,

    /// The direction side table, in the same order as the direction axis.
    pub directions: Vec<SkyDirection>,

    /// Free-text provenance entries, oldest first.
    pub history: Vec<String>,
}

impl SolutionTable {
    /// Assemble a freshly-created table with the default solution table name.
    pub fn new(
        tec: TecValues,
        stations: &[Station],
        directions: &[SkyDirection],
        history: Vec<String>,
    ) -> SolutionTable {
        SolutionTable {
            solset: SOLSET_NAME.to_string(),
            soltab: DEFAULT_CORRECTION_NAME.to_string(),
            tec,
            antennas: stations.to_vec(),
            directions: directions.to_vec(),
            history,
        }
    }

    pub fn with_soltab(self, soltab: &str) -> SolutionTable {
        SolutionTable {
            soltab: soltab.to_string(),
            ..self
        }
    }

    /// Check that the arrays, axes and side tables all agree. On failure, the
    /// offending thing and its expected and actual lengths are returned.
    pub(crate) fn check_consistency(&self) -> Result<(), (&'static str, usize, usize)> {
        let (num_times, num_ants, num_dirs, num_freqs) = self.tec.values.dim();
        let checks = [
            ("time axis", num_times, self.tec.axes.times.len()),
            ("antenna axis", num_ants, self.tec.axes.antennas.len()),
            ("direction axis", num_dirs, self.tec.axes.directions.len()),
            ("frequency axis", num_freqs, self.tec.axes.freqs.len()),
            ("antenna table", num_ants, self.antennas.len()),
            ("direction table", num_dirs, self.directions.len()),
        ];
        for (thing, expected, actual) in checks {
            if expected != actual {
                return Err((thing, expected, actual));
            }
        }
        if self.tec.values.dim() != self.tec.weights.dim() {
            return Err(("weights", self.tec.values.len(), self.tec.weights.len()));
        }
        Ok(())
    }

    /// Write the table to `file`. The table is written next to `file` first and
    /// then moved over it, so an existing table at `file` is replaced only if
    /// the new table was written successfully.
    pub fn write(&self, file: &Path) -> Result<(), SolutionsWriteError> {
        if file.exists() {
            debug!("Replacing the existing solution table {}", file.display());
        }
        fits::write(self, file)
    }

    /// Read a table written by [`SolutionTable::write`].
    pub fn read(file: &Path) -> Result<SolutionTable, SolutionsReadError> {
        fits::read(file)
    }
}

/// Assemble a new solution table for `tec`, with a creation entry naming
/// `source`, and write it to `file`.
pub fn persist(
    file: &Path,
    tec: TecValues,
    stations: &[Station],
    directions: &[SkyDirection],
    soltab: &str,
    source: &TecSource,
) -> Result<SolutionTable, SolutionsWriteError> {
    let table = SolutionTable::new(
        tec,
        stations,
        directions,
        vec![creation_entry(file, source)],
    )
    .with_soltab(soltab);
    table.write(file)?;
    Ok(table)
}
