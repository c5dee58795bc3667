// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generate a TEC solution table, either from a TEC cube or from a travelling
//! ionospheric disturbance, and point the prediction step at it.


use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use clap::Parser;
use hifitime::Duration;
use log::{debug, info, trace};
use marlu::LatLngHeight;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{
    display_warnings, InfoPrinter, Warn, ARG_FILE_HELP, PARAMETERS_HELP, REFERENCE_POSITION_HELP,
};
use crate::{
    constants::{
        DEFAULT_CORRECTION_NAME, DEFAULT_NUM_THREADS, DEFAULT_SHELL_HEIGHT_M,
        DEFAULT_TID_AMPLITUDE, DEFAULT_TID_AZIMUTH_DEG, DEFAULT_TID_VELOCITY_KMH,
        DEFAULT_TID_WAVELENGTH_KM,
    },
    obs::Observation,
    params::{TecGenerator, TecParams},
    solutions::check_soltab_name,
    tec::{TecCube, TecMethod, WaveError, WaveParams, TEC_METHODS},
    TecsimError,
};

const DEFAULT_WAVE_OUTPUT_FILENAME: &str = "tec.fits";
const CUBE_OUTPUT_EXTENSION: &str = "h5parm.fits";

lazy_static::lazy_static! {
    static ref METHOD_HELP: String =
        format!("How TEC values are generated. Valid methods are: {}. Default: fits if a TEC cube is given, otherwise wave", *TEC_METHODS);

    static ref OUTPUT_HELP: String =
        format!("Path to the output solution table. Default: <cube>.{CUBE_OUTPUT_EXTENSION} for the fits method, {DEFAULT_WAVE_OUTPUT_FILENAME} for the wave method");

    static ref CORRECTION_HELP: String =
        format!("The name of the correction (solution table) the prediction step applies. Default: {DEFAULT_CORRECTION_NAME}");

    static ref SHELL_HEIGHT_HELP: String =
        format!("The height of the thin ionospheric shell [metres]. Default: {DEFAULT_SHELL_HEIGHT_M}");

    static ref TID_AMPLITUDE_HELP: String =
        format!("The amplitude of the travelling ionospheric disturbance [TECU]. Default: {DEFAULT_TID_AMPLITUDE}");

    static ref TID_VELOCITY_HELP: String =
        format!("The speed of the travelling ionospheric disturbance [km/h]. Default: {DEFAULT_TID_VELOCITY_KMH}");

    static ref TID_WAVELENGTH_HELP: String =
        format!("The wavelength of the travelling ionospheric disturbance [km]. Default: {DEFAULT_TID_WAVELENGTH_KM}");

    static ref TID_AZIMUTH_HELP: String =
        format!("The azimuth the travelling ionospheric disturbance propagates along [degrees, North through East]. Default: {DEFAULT_TID_AZIMUTH_DEG}");

    static ref NUM_THREADS_HELP: String =
        format!("The number of threads used to synthesise the wave. Default: {DEFAULT_NUM_THREADS}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct TecCliArgs {
    #[clap(short, long, help = METHOD_HELP.as_str(), help_heading = "TEC")]
    pub(super) method: Option<String>,

    /// Path to the observation description (stations, directions, time and
    /// frequency axes).
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) observation: Option<PathBuf>,

    /// Path to the TEC cube. Only used by the fits method.
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) fits_cube: Option<PathBuf>,

    #[clap(
        short = 'O',
        long,
        parse(from_os_str),
        help = OUTPUT_HELP.as_str(),
        help_heading = "OUTPUT FILES"
    )]
    pub(super) output: Option<PathBuf>,

    #[clap(
        short,
        long,
        parse(from_os_str),
        help = PARAMETERS_HELP.as_str(),
        help_heading = "OUTPUT FILES"
    )]
    pub(super) parameters: Option<PathBuf>,

    #[clap(long, help = CORRECTION_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) correction: Option<String>,
}

impl TecCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            method: self.method.or(other.method),
            observation: self.observation.or(other.observation),
            fits_cube: self.fits_cube.or(other.fits_cube),
            output: self.output.or(other.output),
            parameters: self.parameters.or(other.parameters),
            correction: self.correction.or(other.correction),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct WaveArgs {
    #[clap(long, help = SHELL_HEIGHT_HELP.as_str(), help_heading = "WAVE")]
    pub(super) shell_height: Option<f64>,

    #[clap(long, help = TID_AMPLITUDE_HELP.as_str(), help_heading = "WAVE")]
    pub(super) tid_amplitude: Option<f64>,

    #[clap(long, help = TID_VELOCITY_HELP.as_str(), help_heading = "WAVE")]
    pub(super) tid_velocity: Option<f64>,

    #[clap(long, help = TID_WAVELENGTH_HELP.as_str(), help_heading = "WAVE")]
    pub(super) tid_wavelength: Option<f64>,

    #[clap(
        long,
        help = TID_AZIMUTH_HELP.as_str(),
        help_heading = "WAVE",
        allow_hyphen_values = true
    )]
    pub(super) tid_azimuth: Option<f64>,

    #[clap(
        long, help = REFERENCE_POSITION_HELP.as_str(), help_heading = "WAVE",
        number_of_values = 3,
        allow_hyphen_values = true,
        value_names = &["LONG_DEG", "LAT_DEG", "HEIGHT_M"]
    )]
    pub(super) reference_position: Option<Vec<f64>>,

    /// Use this value as the DUT1 [seconds]. Default: 0
    #[clap(long, help_heading = "WAVE", allow_hyphen_values = true)]
    pub(super) dut1: Option<f64>,

    /// Don't precess the LMST and latitude to J2000 when converting directions
    /// to horizon coordinates.
    #[clap(long, help_heading = "WAVE")]
    #[serde(default)]
    pub(super) no_precession: bool,

    #[clap(long, help = NUM_THREADS_HELP.as_str(), help_heading = "WAVE")]
    pub(super) num_threads: Option<usize>,
}

impl WaveArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            shell_height: self.shell_height.or(other.shell_height),
            tid_amplitude: self.tid_amplitude.or(other.tid_amplitude),
            tid_velocity: self.tid_velocity.or(other.tid_velocity),
            tid_wavelength: self.tid_wavelength.or(other.tid_wavelength),
            tid_azimuth: self.tid_azimuth.or(other.tid_azimuth),
            reference_position: self.reference_position.or(other.reference_position),
            dut1: self.dut1.or(other.dut1),
            no_precession: self.no_precession || other.no_precession,
            num_threads: self.num_threads.or(other.num_threads),
        }
    }

    /// Were any wave-only arguments given?
    fn any_given(&self) -> bool {
        let WaveArgs {
            shell_height,
            tid_amplitude,
            tid_velocity,
            tid_wavelength,
            tid_azimuth,
            reference_position,
            dut1,
            no_precession,
            num_threads,
        } = self;
        shell_height.is_some()
            || tid_amplitude.is_some()
            || tid_velocity.is_some()
            || tid_wavelength.is_some()
            || tid_azimuth.is_some()
            || reference_position.is_some()
            || dut1.is_some()
            || *no_precession
            || num_threads.is_some()
    }

    fn parse(self) -> Result<WaveParams, TecArgsError> {
        let WaveArgs {
            shell_height,
            tid_amplitude,
            tid_velocity,
            tid_wavelength,
            tid_azimuth,
            reference_position,
            dut1,
            no_precession,
            num_threads,
        } = self;
        let defaults = WaveParams::default();

        let reference = match reference_position.as_deref() {
            None => defaults.reference,
            Some(&[long_deg, lat_deg, height_metres]) => {
                if !(-90.0..=90.0).contains(&lat_deg) {
                    return Err(TecArgsError::BadReferencePosition(format!(
                        "latitude {lat_deg}° is not within [-90°, 90°]"
                    )));
                }
                LatLngHeight {
                    longitude_rad: long_deg.to_radians(),
                    latitude_rad: lat_deg.to_radians(),
                    height_metres,
                }
            }
            Some(other) => {
                return Err(TecArgsError::BadReferencePosition(format!(
                    "expected 3 values (longitude, latitude, height), but got {}",
                    other.len()
                )))
            }
        };

        let num_threads = match num_threads {
            None => defaults.num_threads,
            Some(n) => NonZeroUsize::new(n).ok_or(TecArgsError::BadNumThreads)?,
        };

        Ok(WaveParams {
            amplitude: tid_amplitude.unwrap_or(defaults.amplitude),
            velocity_kmh: tid_velocity.unwrap_or(defaults.velocity_kmh),
            wavelength_km: tid_wavelength.unwrap_or(defaults.wavelength_km),
            azimuth_deg: tid_azimuth.unwrap_or(defaults.azimuth_deg),
            shell_height_m: shell_height.unwrap_or(defaults.shell_height_m),
            reference,
            precess: !no_precession,
            dut1: dut1.map(Duration::from_seconds).unwrap_or(defaults.dut1),
            num_threads,
        })
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct TecArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "tec")]
    #[serde(default)]
    pub(super) tec_args: TecCliArgs,

    #[clap(flatten)]
    #[serde(rename = "wave")]
    #[serde(default)]
    pub(super) wave_args: WaveArgs,
}

impl TecArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<TecArgs, TecsimError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let TecArgs {
                args_file: _,
                tec_args,
                wave_args,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(TecArgs {
                args_file: None,
                tec_args: cli_args.tec_args.merge(tec_args),
                wave_args: cli_args.wave_args.merge(wave_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<TecParams, TecsimError> {
        debug!("{:#?}", self);

        // Expose all the struct fields to ensure they're all used.
        let TecArgs {
            args_file: _,
            tec_args:
                TecCliArgs {
                    method,
                    observation,
                    fits_cube,
                    output,
                    parameters,
                    correction,
                },
            wave_args,
        } = self;

        let method = match method {
            Some(m) => TecMethod::parse(&m)?,
            None if fits_cube.is_some() => TecMethod::FitsCube,
            None => TecMethod::Wave,
        };

        let observation_file = observation.ok_or(TecArgsError::NoObservation)?;
        let observation = Observation::read(&observation_file)?;
        let mut obs_printer = InfoPrinter::new(
            format!("Generating TEC with the {method} method").into(),
        );
        obs_printer.push_line(format!("Observation: {}", observation_file.display()).into());
        obs_printer.push_block(vec![
            format!("{} stations", observation.stations.len()).into(),
            format!("{} directions", observation.directions.len()).into(),
        ]);
        match &observation.timestamps {
            Some(t) => obs_printer.push_line(
                format!("{} timesteps, first {}", t.len(), t.first()).into(),
            ),
            None => obs_printer.push_line("No time axis".into()),
        }
        match &observation.freqs {
            Some(f) => obs_printer.push_line(
                format!(
                    "{} channels, {:.3} to {:.3} MHz",
                    f.len(),
                    f.first() / 1e6,
                    f.last() / 1e6
                )
                .into(),
            ),
            None => obs_printer.push_line("No frequency axis".into()),
        }
        obs_printer.display();

        let generator = match method {
            TecMethod::FitsCube => {
                let file = fits_cube.ok_or(TecArgsError::NoCube)?;
                if wave_args.any_given() {
                    "Wave arguments are ignored by the fits method".warn();
                }
                let cube = TecCube::read(&file)?;
                let (num_times, num_freqs, num_ants, ny, nx) = cube.data.dim();
                let mut cube_printer = InfoPrinter::new("TEC cube".into());
                cube_printer.push_line(format!("{}", file.display()).into());
                cube_printer.push_block(vec![
                    format!("{nx}x{ny} pixels ({} projection)", cube.wcs.projection).into(),
                    format!("{num_ants} antennas").into(),
                    format!("{num_times} timesteps, {num_freqs} channels").into(),
                ]);
                cube_printer.display();

                if let Some(t) = &observation.timestamps {
                    if t.len() != num_times {
                        format!(
                            "The TEC cube has {num_times} timesteps, but the observation has {}; the cube's time axis is used",
                            t.len()
                        )
                        .warn();
                    }
                }
                TecGenerator::Cube { cube, file }
            }

            TecMethod::Wave => {
                if let Some(file) = &fits_cube {
                    format!(
                        "The TEC cube {} is ignored by the wave method",
                        file.display()
                    )
                    .warn();
                }
                if observation.timestamps.is_none() {
                    return Err(WaveError::NoTimestamps.into());
                }
                if observation.freqs.is_none() {
                    return Err(WaveError::NoFreqs.into());
                }
                let wave_params = wave_args.parse()?;
                wave_params.validate()?;

                let mut wave_printer = InfoPrinter::new("Travelling ionospheric disturbance".into());
                wave_printer.push_block(vec![
                    format!("Amplitude:  {} TECU", wave_params.amplitude).into(),
                    format!("Velocity:   {} km/h", wave_params.velocity_kmh).into(),
                    format!("Wavelength: {} km", wave_params.wavelength_km).into(),
                    format!("Azimuth:    {}°", wave_params.azimuth_deg).into(),
                ]);
                wave_printer.push_line(
                    format!("Shell height: {} km", wave_params.shell_height_m / 1e3).into(),
                );
                wave_printer.push_line(
                    format!(
                        "Reference: ({:.4}°, {:.4}°, {}m)",
                        wave_params.reference.longitude_rad.to_degrees(),
                        wave_params.reference.latitude_rad.to_degrees(),
                        wave_params.reference.height_metres
                    )
                    .into(),
                );
                if !wave_params.precess {
                    wave_printer.push_line("Not precessing to J2000".into());
                }
                wave_printer.display();
                TecGenerator::Wave(wave_params)
            }
        };

        let output = output.unwrap_or_else(|| default_output(&generator));
        let correction = correction.unwrap_or_else(|| DEFAULT_CORRECTION_NAME.to_string());
        check_soltab_name(&correction)?;

        let mut output_printer = InfoPrinter::new("Output".into());
        output_printer
            .push_line(format!("Solution table: {} ({correction})", output.display()).into());
        match &parameters {
            Some(p) => {
                output_printer.push_line(format!("Parameter set: {}", p.display()).into())
            }
            None => output_printer.push_line("Not updating any parameter set".into()),
        }
        output_printer.display();

        display_warnings();

        Ok(TecParams {
            observation,
            generator,
            output,
            correction,
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

        let table = params.run()?;
        info!(
            "TEC from the {} method: {} timesteps, {} antennas, {} directions, {} channels",
            params.generator.method(),
            table.tec.axes.times.len(),
            table.antennas.len(),
            table.directions.len(),
            table.tec.axes.freqs.len()
        );
        Ok(())
    }
}

fn default_output(generator: &TecGenerator) -> PathBuf {
    match generator {
        TecGenerator::Cube { file, .. } => cube_output(file),
        TecGenerator::Wave(_) => PathBuf::from(DEFAULT_WAVE_OUTPUT_FILENAME),
    }
}

fn cube_output(cube: &Path) -> PathBuf {
    cube.with_extension(CUBE_OUTPUT_EXTENSION)
}

#[derive(Error, Debug)]
pub(super) enum TecArgsError {
    #[error("No observation description was supplied")]
    NoObservation,

    #[error("The fits method needs a TEC cube, but none was supplied")]
    NoCube,

    #[error("The number of threads must be at least 1")]
    BadNumThreads,

    #[error("Bad reference position: {0}")]
    BadReferencePosition(String),
}
