// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthesising TEC from a travelling ionospheric disturbance (TID).
//!
//! For each direction and timestep, the direction is converted to (az, el) at
//! a geographic reference location. Each station's line of sight along that
//! (az, el) pierces a thin spherical shell; the piercing point is projected
//! onto the local tangent plane of the reference location, and the TID
//!
//! `tec = amplitude * sin(2π (x + v t) / λ)`
//!
//! is evaluated at the along-wave coordinate `x`, scaled by the slant factor of
//! the line of sight.

use std::num::NonZeroUsize;

use hifitime::{Duration, Epoch};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, trace};
use marlu::{
    precession::{get_lmst, precess_time},
    LatLngHeight, RADec, XyzGeocentric,
};
use ndarray::prelude::*;
use rayon::prelude::*;

use super::{TecAxes, TecValues, WaveError};
use crate::{
    constants::*,
    coord::{azel_to_geocentric_direction, get_piercing_point},
    obs::{SkyDirection, Station},
    PROGRESS_BARS,
};

/// Parameters of the travelling ionospheric disturbance and of the geometry
/// it is observed through.
#[derive(Debug, Clone, Copy)]
pub struct WaveParams {
    /// \[TECU\]
    pub amplitude: f64,

    /// \[km/h\]
    pub velocity_kmh: f64,

    /// \[km\]
    pub wavelength_km: f64,

    /// The direction the wave's crests are spaced along \[degrees, North
    /// through East\].
    pub azimuth_deg: f64,

    /// \[metres\]
    pub shell_height_m: f64,

    /// Where local horizon coordinates and the tangent plane are defined.
    pub reference: LatLngHeight,

    /// Should the LMST and latitude be precessed to J2000 when converting
    /// directions to (az, el)?
    pub precess: bool,

    pub dut1: Duration,

    /// The number of worker threads.
    pub num_threads: NonZeroUsize,
}

impl Default for WaveParams {
    fn default() -> Self {
        WaveParams {
            amplitude: DEFAULT_TID_AMPLITUDE,
            velocity_kmh: DEFAULT_TID_VELOCITY_KMH,
            wavelength_km: DEFAULT_TID_WAVELENGTH_KM,
            azimuth_deg: DEFAULT_TID_AZIMUTH_DEG,
            shell_height_m: DEFAULT_SHELL_HEIGHT_M,
            reference: LatLngHeight {
                longitude_rad: REFERENCE_LONG_DEG.to_radians(),
                latitude_rad: REFERENCE_LAT_DEG.to_radians(),
                height_metres: REFERENCE_HEIGHT_M,
            },
            precess: true,
            dut1: Duration::from_seconds(0.0),
            num_threads: NonZeroUsize::new(DEFAULT_NUM_THREADS).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl WaveParams {
    pub(crate) fn validate(&self) -> Result<(), WaveError> {
        let lat_deg = self.reference.latitude_rad.to_degrees();
        let checks: [(&'static str, &'static str, f64, bool); 5] = [
            ("amplitude", "finite", self.amplitude, self.amplitude.is_finite()),
            ("velocity", "finite", self.velocity_kmh, self.velocity_kmh.is_finite()),
            (
                "wavelength",
                "positive",
                self.wavelength_km,
                self.wavelength_km > 0.0 && self.wavelength_km.is_finite(),
            ),
            (
                "shell height",
                "positive",
                self.shell_height_m,
                self.shell_height_m > 0.0 && self.shell_height_m.is_finite(),
            ),
            (
                "reference latitude",
                "within [-90°, 90°]",
                lat_deg,
                (-90.0..=90.0).contains(&lat_deg),
            ),
        ];
        for (param, requirement, value, ok) in checks {
            if !ok {
                return Err(WaveError::BadParam {
                    param,
                    requirement,
                    value,
                });
            }
        }
        Ok(())
    }

    /// The TID at along-wave coordinate `x` \[metres\] and `t` seconds after the
    /// first timestep.
    pub fn tid(&self, x: f64, t: f64) -> f64 {
        let velocity = self.velocity_kmh * 1e3 / 3600.0;
        let wavelength = self.wavelength_km * 1e3;
        self.amplitude * (TAU * (x + velocity * t) / wavelength).sin()
    }
}

/// Synthesise TEC values over (time, antenna, direction, frequency). The TEC
/// does not depend on frequency; the value is repeated over `freqs`. All
/// weights are 1.
///
/// Directions are handled in parallel, but the result is always in the order
/// of `directions`. If any line of sight can't be traced, the whole synthesis
/// fails.
pub fn synthesize(
    directions: &[SkyDirection],
    stations: &[Station],
    timestamps: &[Epoch],
    freqs: &[f64],
    params: &WaveParams,
) -> Result<TecValues, WaveError> {
    params.validate()?;
    let first_timestamp = *timestamps.first().ok_or(WaveError::NoTimestamps)?;
    if freqs.is_empty() {
        return Err(WaveError::NoFreqs);
    }

    let reference = params.reference;
    // Only the J2000 LMST and latitude are used, and they don't depend on the
    // phase centre.
    let phase_centre = directions
        .first()
        .map(|d| d.radec)
        .unwrap_or_else(|| RADec::from_radians(0.0, 0.0));
    // (LMST, latitude, seconds since the first timestep) per timestep.
    let time_geometry: Vec<(f64, f64, f64)> = timestamps
        .iter()
        .map(|&timestamp| {
            let t = (timestamp - first_timestamp).to_seconds();
            if params.precess {
                let precession_info = precess_time(
                    reference.longitude_rad,
                    reference.latitude_rad,
                    phase_centre,
                    timestamp,
                    params.dut1,
                );
                trace!(
                    "t = {t} s, LMST {}°, J2000 LMST {}°",
                    precession_info.lmst.to_degrees(),
                    precession_info.lmst_j2000.to_degrees()
                );
                (
                    precession_info.lmst_j2000,
                    precession_info.array_latitude_j2000,
                    t,
                )
            } else {
                let lmst = get_lmst(reference.longitude_rad, timestamp, params.dut1);
                trace!("t = {t} s, LMST {}°", lmst.to_degrees());
                (lmst, reference.latitude_rad, t)
            }
        })
        .collect();

    let (s_az, c_az) = params.azimuth_deg.to_radians().sin_cos();
    // Piercing points are projected onto the tangent plane at the reference.
    let reference_vector = XyzGeocentric::get_geocentric_vector(reference);
    let (s_long, c_long) = reference.longitude_rad.sin_cos();
    let (s_lat, c_lat) = reference.latitude_rad.sin_cos();
    let axes = TecAxes {
        times: timestamps.iter().map(|e| e.to_mjd_utc_seconds()).collect(),
        antennas: stations.iter().map(|s| s.name.clone()).collect(),
        directions: directions.iter().map(|d| d.name.clone()).collect(),
        freqs: freqs.to_vec(),
    };
    let mut values = Array4::zeros(axes.dim());

    let progress = ProgressBar::with_draw_target(
        Some(directions.len() as _),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg}: [{wide_bar:.blue}] {pos:3}/{len:3} ({elapsed_precise}<{eta_precise})")
            .unwrap()
            .progress_chars("=> "),
    )
    .with_position(0)
    .with_message("Synthesising TEC");

    debug!(
        "Synthesising TEC for {} directions with {} threads",
        directions.len(),
        params.num_threads
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.num_threads.get())
        .build()?;
    pool.install(|| {
        // Each direction owns its own (time, antenna, frequency) slice of the
        // output, so results land in input order.
        values
            .axis_iter_mut(Axis(2))
            .into_par_iter()
            .zip(directions.par_iter())
            .try_for_each(|(mut values_taf, direction)| {
                for (i_time, (mut values_af, &(lmst, latitude, t))) in values_taf
                    .outer_iter_mut()
                    .zip(time_geometry.iter())
                    .enumerate()
                {
                    let azel = direction.radec.to_hadec(lmst).to_azel(latitude);
                    let los = azel_to_geocentric_direction(azel, reference);
                    for (mut values_f, station) in values_af.outer_iter_mut().zip(stations) {
                        let pp = get_piercing_point(station.position, los, params.shell_height_m)
                            .ok_or_else(|| WaveError::NoPiercePoint {
                                station: station.name.clone(),
                                direction: direction.name.clone(),
                                timestep: i_time,
                            })?;
                        let enh = pp
                            .pos
                            .to_geodetic_inner(reference_vector, s_long, c_long)
                            .to_enh_inner(s_lat, c_lat);
                        let x = enh.e * s_az + enh.n * c_az;
                        values_f.fill(params.tid(x, t) * pp.secant);
                    }
                }
                progress.inc(1);
                Ok::<(), WaveError>(())
            })
    })?;
    progress.abandon_with_message("Finished synthesising TEC");
    Ok(TecValues {
        weights: Array4::ones(values.dim()),
        values,
        axes,
    })
}
