// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The parameter set shared with the visibility-prediction step.
//!
//! Configurators (e.g. [`apply_tec`] and [`apply_beam`]) only change a
//! [`ParameterSet`] through two operations:
//!
//! - [`ParameterSet::set`] overwrites whatever is stored under a key;
//! - [`ParameterSet::append_to_list`] appends to the list stored under a key,
//!   creating a single-element list if the key is absent.
//!
//! Lists therefore accumulate the corrections of every configurator that has
//! run, in the order they ran.

mod error;

pub use error::ParsetError;

use std::{fmt::Display, path::Path, str::FromStr};

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::io::{StructuredFileType, STRUCTURED_FILE_EXTENSIONS};

/// Keys read by the prediction step.
pub mod keys {
    pub const APPLYCAL_PARMDB: &str = "predict.applycal.parmdb";
    pub const APPLYCAL_STEPS: &str = "predict.applycal.steps";
    pub const APPLYCAL_CORRECTION: &str = "predict.applycal.correction";
    pub const USE_BEAM_MODEL: &str = "predict.usebeammodel";
    pub const BEAM_MODE: &str = "predict.beammode";
    pub const USE_CHANNEL_FREQ: &str = "predict.usechannelfreq";
    pub const ONE_BEAM_PER_PATCH: &str = "predict.onebeamperpatch";

    /// The key holding the solution table name of a named applycal step, e.g.
    /// "predict.applycal.tec.correction".
    pub fn step_correction(step: &str) -> String {
        format!("predict.applycal.{step}.correction")
    }
}

/// The name of the TEC correction step.
pub const TEC_STEP: &str = "tec";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsetValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl Display for ParsetValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParsetValue::Bool(b) => write!(f, "{b}"),
            ParsetValue::Int(i) => write!(f, "{i}"),
            ParsetValue::Float(x) => write!(f, "{x}"),
            ParsetValue::Str(s) => write!(f, "{s}"),
            ParsetValue::List(l) => write!(f, "[{}]", l.iter().join(", ")),
        }
    }
}

impl From<bool> for ParsetValue {
    fn from(b: bool) -> Self {
        ParsetValue::Bool(b)
    }
}

impl From<i64> for ParsetValue {
    fn from(i: i64) -> Self {
        ParsetValue::Int(i)
    }
}

impl From<f64> for ParsetValue {
    fn from(x: f64) -> Self {
        ParsetValue::Float(x)
    }
}

impl From<&str> for ParsetValue {
    fn from(s: &str) -> Self {
        ParsetValue::Str(s.to_string())
    }
}

impl From<String> for ParsetValue {
    fn from(s: String) -> Self {
        ParsetValue::Str(s)
    }
}

impl From<Vec<String>> for ParsetValue {
    fn from(l: Vec<String>) -> Self {
        ParsetValue::List(l)
    }
}

/// A value or a table of values as written in a file. Tables come from dotted
/// keys (e.g. `predict.applycal.steps = [...]` in TOML) or nested objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParsetEntry {
    Value(ParsetValue),
    Table(IndexMap<String, ParsetEntry>),
}

/// Insert `entries` into `map`, joining the keys of nested tables with dots.
fn flatten_entries(
    map: &mut IndexMap<String, ParsetValue>,
    prefix: Option<&str>,
    entries: IndexMap<String, ParsetEntry>,
) {
    for (key, entry) in entries {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key,
        };
        match entry {
            ParsetEntry::Value(value) => {
                if let Some(old) = map.insert(key.clone(), value) {
                    debug!("Parameter {key} was given more than once; dropping {old}");
                }
            }
            ParsetEntry::Table(table) => flatten_entries(map, Some(&key), table),
        }
    }
}

/// An insertion-ordered mapping of parameter keys to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(IndexMap<String, ParsetValue>);

impl ParameterSet {
    pub fn new() -> ParameterSet {
        ParameterSet::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParsetValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParsetValue)> {
        self.0.iter()
    }

    /// Store `value` under `key`, replacing (and returning) any existing value.
    pub fn set(&mut self, key: &str, value: impl Into<ParsetValue>) -> Option<ParsetValue> {
        let value = value.into();
        trace!("Setting {key} = {value}");
        self.0.insert(key.to_string(), value)
    }

    /// Append `item` to the list stored under `key`. If there is no such key, a
    /// list containing only `item` is stored. Keys holding anything other than
    /// a list are left alone and an error is returned.
    pub fn append_to_list(&mut self, key: &str, item: &str) -> Result<(), ParsetError> {
        match self.0.get_mut(key) {
            Some(ParsetValue::List(l)) => l.push(item.to_string()),
            Some(other) => {
                return Err(ParsetError::NotAList {
                    key: key.to_string(),
                    item: item.to_string(),
                    value: other.to_string(),
                })
            }
            None => {
                self.0
                    .insert(key.to_string(), ParsetValue::List(vec![item.to_string()]));
            }
        }
        trace!("Appended {item} to {key}");
        Ok(())
    }

    /// Read a parameter set from a TOML or JSON file.
    pub fn read(file: &Path) -> Result<ParameterSet, ParsetError> {
        debug!("Reading parameter set {}", file.display());
        let file_type = file_type(file)?;
        let contents = std::fs::read_to_string(file)?;
        let entries: IndexMap<String, ParsetEntry> = match file_type {
            StructuredFileType::Toml => {
                toml::from_str(&contents).map_err(|err| ParsetError::TomlDecode {
                    file: file.to_path_buf(),
                    err,
                })?
            }
            StructuredFileType::Json => {
                serde_json::from_str(&contents).map_err(|err| ParsetError::Json {
                    file: file.to_path_buf(),
                    err,
                })?
            }
        };
        let mut map = IndexMap::with_capacity(entries.len());
        flatten_entries(&mut map, None, entries);
        Ok(ParameterSet(map))
    }

    /// Write the parameter set to a TOML or JSON file, depending on its
    /// extension.
    pub fn write(&self, file: &Path) -> Result<(), ParsetError> {
        debug!("Writing parameter set {}", file.display());
        let contents = match file_type(file)? {
            StructuredFileType::Toml => toml::to_string(self)?,
            StructuredFileType::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(file, contents)?;
        Ok(())
    }
}

fn file_type(file: &Path) -> Result<StructuredFileType, ParsetError> {
    StructuredFileType::from_path(file).ok_or_else(|| ParsetError::UnknownExtension {
        file: file.to_path_buf(),
        exts: STRUCTURED_FILE_EXTENSIONS.clone(),
    })
}

/// Tell the prediction step to apply the TEC solution table `correction` in
/// `table`. The TEC step is appended to any steps already configured.
pub fn apply_tec(
    params: &mut ParameterSet,
    table: &Path,
    correction: &str,
) -> Result<(), ParsetError> {
    params.set(keys::APPLYCAL_PARMDB, table.display().to_string());
    params.append_to_list(keys::APPLYCAL_STEPS, TEC_STEP)?;
    params.set(keys::APPLYCAL_CORRECTION, correction);
    params.set(&keys::step_correction(TEC_STEP), correction);
    Ok(())
}

/// Which parts of the station beam the prediction step applies.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq)]
pub enum BeamMode {
    /// The array factor and the element beam.
    #[strum(serialize = "default")]
    Default,

    #[strum(serialize = "array_factor")]
    ArrayFactor,

    #[strum(serialize = "element")]
    Element,
}

lazy_static::lazy_static! {
    pub(crate) static ref BEAM_MODES: String = BeamMode::iter().join(", ");
}

impl BeamMode {
    pub fn parse(s: &str) -> Result<BeamMode, ParsetError> {
        BeamMode::from_str(s.trim()).map_err(|_| ParsetError::UnknownBeamMode {
            got: s.to_string(),
            valid: BEAM_MODES.clone(),
        })
    }
}

/// Tell the prediction step to corrupt visibilities with the station beam.
pub fn apply_beam(
    params: &mut ParameterSet,
    mode: BeamMode,
    use_channel_freq: bool,
    one_beam_per_patch: bool,
) {
    params.set(keys::USE_BEAM_MODEL, true);
    params.set(keys::BEAM_MODE, mode.to_string());
    params.set(keys::USE_CHANNEL_FREQ, use_channel_freq);
    params.set(keys::ONE_BEAM_PER_PATCH, one_beam_per_patch);
}
