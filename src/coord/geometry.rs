// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Geometry of lines of sight through a thin-shell ionosphere.

use marlu::{AzEl, LatLngHeight, XyzGeocentric};

use crate::constants::EARTH_RADIUS_M;

/// Where a line of sight pierces the ionospheric shell.
#[derive(Debug, Clone, Copy)]
pub struct PiercePoint {
    /// The geocentric position of the piercing point \[metres\].
    pub pos: XyzGeocentric,

    /// The secant of the zenith angle of the line of sight at the piercing
    /// point (i.e. the slant factor).
    pub secant: f64,
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Get the geocentric unit vector pointing toward a local horizon direction
/// seen from `pos`.
pub fn azel_to_geocentric_direction(azel: AzEl, pos: LatLngHeight) -> [f64; 3] {
    let (s_az, c_az) = azel.az.sin_cos();
    let (s_el, c_el) = azel.el.sin_cos();
    let (s_lat, c_lat) = pos.latitude_rad.sin_cos();
    let (s_lng, c_lng) = pos.longitude_rad.sin_cos();
    let (e, n, u) = (s_az * c_el, c_az * c_el, s_el);
    [
        -s_lng * e - s_lat * c_lng * n + c_lat * c_lng * u,
        c_lng * e - s_lat * s_lng * n + c_lat * s_lng * u,
        c_lat * n + s_lat * u,
    ]
}

/// Find where the ray from `station` along `direction` leaves a spherical
/// shell `shell_height` metres above a spherical Earth. `None` is returned if
/// the ray never reaches the shell going forward.
pub fn get_piercing_point(
    station: XyzGeocentric,
    direction: [f64; 3],
    shell_height: f64,
) -> Option<PiercePoint> {
    let p = [station.x, station.y, station.z];
    let radius = EARTH_RADIUS_M + shell_height;

    let a = dot(direction, direction);
    let b = 2.0 * dot(p, direction);
    let c = dot(p, p) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if a == 0.0 || discriminant < 0.0 {
        return None;
    }
    let alpha = (-b + discriminant.sqrt()) / (2.0 * a);
    if alpha < 0.0 {
        return None;
    }

    let pp = [
        p[0] + alpha * direction[0],
        p[1] + alpha * direction[1],
        p[2] + alpha * direction[2],
    ];
    let cos_za = dot(pp, direction) / (dot(pp, pp).sqrt() * a.sqrt());
    if cos_za <= 0.0 || !cos_za.is_finite() {
        return None;
    }

    Some(PiercePoint {
        pos: XyzGeocentric {
            x: pp[0],
            y: pp[1],
            z: pp[2],
        },
        secant: 1.0 / cos_za,
    })
}
