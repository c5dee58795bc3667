// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configure the station beam applied by the prediction step.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{display_warnings, InfoPrinter, ARG_FILE_HELP, PARAMETERS_HELP};
use crate::{
    params::BeamParams,
    parset::{BeamMode, ParsetError, BEAM_MODES},
    TecsimError,
};

lazy_static::lazy_static! {
    static ref MODE_HELP: String =
        format!("Which parts of the station beam are applied. Valid modes are: {}. Default: {}", *BEAM_MODES, BeamMode::Default);
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct BeamArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(short, long, help = MODE_HELP.as_str(), help_heading = "BEAM")]
    pub(super) mode: Option<String>,

    /// Evaluate the beam at each channel's frequency rather than at the
    /// centre frequency.
    #[clap(long, help_heading = "BEAM")]
    #[serde(default)]
    pub(super) no_channel_freq: bool,

    /// Evaluate a single beam per patch of sky rather than per source.
    #[clap(long, help_heading = "BEAM")]
    #[serde(default)]
    pub(super) one_beam_per_patch: bool,

    #[clap(
        short,
        long,
        parse(from_os_str),
        help = PARAMETERS_HELP.as_str(),
        help_heading = "OUTPUT FILES"
    )]
    pub(super) parameters: Option<PathBuf>,
}

impl BeamArgs {
    /// Merge the command-line arguments with those in the argument file (if
    /// given), preferring the CLI.
    pub(super) fn merge(self) -> Result<BeamArgs, TecsimError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let BeamArgs {
                args_file: _,
                mode,
                no_channel_freq,
                one_beam_per_patch,
                parameters,
            } = unpack_arg_file!(arg_file);

            Ok(BeamArgs {
                args_file: None,
                mode: cli_args.mode.or(mode),
                no_channel_freq: cli_args.no_channel_freq || no_channel_freq,
                one_beam_per_patch: cli_args.one_beam_per_patch || one_beam_per_patch,
                parameters: cli_args.parameters.or(parameters),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<BeamParams, TecsimError> {
        let BeamArgs {
            args_file: _,
            mode,
            no_channel_freq,
            one_beam_per_patch,
            parameters,
        } = self;

        let mode = match mode {
            Some(m) => BeamMode::parse(&m).map_err(BeamArgsError::from)?,
            None => BeamMode::Default,
        };
        let parameters = parameters.ok_or(BeamArgsError::NoParameters)?;

        let mut printer = InfoPrinter::new(format!("Configuring the '{mode}' beam").into());
        printer.push_block(vec![
            format!("Channel frequencies: {}", !no_channel_freq).into(),
            format!("One beam per patch:  {one_beam_per_patch}").into(),
        ]);
        printer.push_line(format!("Parameter set: {}", parameters.display()).into());
        printer.display();
        display_warnings();

        Ok(BeamParams {
            mode,
            use_channel_freq: !no_channel_freq,
            one_beam_per_patch,
            parameters,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), TecsimError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run().map_err(BeamArgsError::from)?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub(super) enum BeamArgsError {
    #[error("No parameter set was supplied")]
    NoParameters,

    #[error(transparent)]
    Parset(#[from] ParsetError),
}
