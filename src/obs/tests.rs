// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::indoc;

use super::*;

fn write_tmp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut tmp_file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Couldn't make tmp file");
    tmp_file
        .write_all(contents.as_bytes())
        .expect("Couldn't write tmp file");
    tmp_file
}

const TOML_OBS: &str = indoc! {r#"
    freqs_hz = [120e6, 130e6, 140e6]

    [time]
    start_mjd_s = 5.0e9
    resolution_s = 10.0
    num_timesteps = 4

    [[station]]
    name = "CS001"
    position = [3826923.5, 460915.4, 5064643.5]

    [[station]]
    name = "CS002"
    position = [3826577.1, 461022.9, 5064892.8]

    [[direction]]
    name = "D1"
    ra = 123.4
    dec = 48.2

    [[direction]]
    name = "D0"
    ra = 0.0
    dec = 90.0
"#};

#[test]
fn test_read_toml() {
    let tmp_file = write_tmp(TOML_OBS, ".toml");
    let result = Observation::read(tmp_file.path());
    assert!(result.is_ok(), "{:?}", result.err());
    let obs = result.unwrap();

    assert_eq!(obs.stations.len(), 2);
    assert_eq!(obs.stations[0].name, "CS001");
    assert_abs_diff_eq!(obs.stations[1].position.z, 5064892.8);
    // Order is kept, not sorted.
    assert_eq!(obs.directions[0].name, "D1");
    assert_eq!(obs.directions[1].name, "D0");
    assert_abs_diff_eq!(obs.directions[0].radec.ra, 123.4_f64.to_radians(), epsilon = 1e-12);

    let times = obs.times_mjd_s().unwrap();
    assert_eq!(times.len(), 4);
    for (i, t) in times.iter().enumerate() {
        assert_abs_diff_eq!(*t, 5.0e9 + 10.0 * i as f64, epsilon = 1e-3);
    }
    assert_eq!(obs.freqs.unwrap().as_slice(), &[120e6, 130e6, 140e6]);
}

#[test]
fn test_read_json() {
    let json = indoc! {r#"
        {
            "station": [{"name": "A", "position": [1.0, 2.0, 3.0]}],
            "direction": [{"name": "D", "ra": 10.0, "dec": -20.0}]
        }
    "#};
    let tmp_file = write_tmp(json, ".json");
    let result = Observation::read(tmp_file.path());
    assert!(result.is_ok(), "{:?}", result.err());
    let obs = result.unwrap();
    assert!(obs.timestamps.is_none());
    assert!(obs.freqs.is_none());
    assert_abs_diff_eq!(obs.stations[0].position.y, 2.0);
}

#[test]
fn test_duplicate_names_are_rejected() {
    let toml = TOML_OBS.replace("\"CS002\"", "\"CS001\"");
    let tmp_file = write_tmp(&toml, ".toml");
    let result = Observation::read(tmp_file.path());
    assert!(matches!(
        result,
        Err(ObservationError::DuplicateName { thing: "station", ref name }) if name == "CS001"
    ));
}

#[test]
fn test_bad_position() {
    let toml = TOML_OBS.replace("[3826923.5, 460915.4, 5064643.5]", "[1.0, 2.0]");
    let tmp_file = write_tmp(&toml, ".toml");
    let result = Observation::read(tmp_file.path());
    assert!(matches!(
        result,
        Err(ObservationError::BadPosition { len: 2, .. })
    ));
}

#[test]
fn test_bad_time_axis() {
    let toml = TOML_OBS.replace("num_timesteps = 4", "num_timesteps = 0");
    let tmp_file = write_tmp(&toml, ".toml");
    assert!(matches!(
        Observation::read(tmp_file.path()),
        Err(ObservationError::NoTimesteps)
    ));

    let toml = TOML_OBS.replace("resolution_s = 10.0", "resolution_s = -1.0");
    let tmp_file = write_tmp(&toml, ".toml");
    assert!(matches!(
        Observation::read(tmp_file.path()),
        Err(ObservationError::BadTimeRes(_))
    ));
}

#[test]
fn test_no_directions() {
    let result = Observation::new(
        vec![Station {
            name: "A".to_string(),
            position: XyzGeocentric {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
        }],
        vec![],
        None,
        None,
    );
    assert!(matches!(result, Err(ObservationError::Empty("directions"))));
}

#[test]
fn test_unknown_extension_and_missing_file() {
    let tmp_file = write_tmp(TOML_OBS, ".yaml");
    assert!(matches!(
        Observation::read(tmp_file.path()),
        Err(ObservationError::UnknownExtension { .. })
    ));
    assert!(matches!(
        Observation::read(Path::new("/does/not/exist.toml")),
        Err(ObservationError::DoesntExist(_))
    ));
}

#[test]
fn test_names_with_surrounding_whitespace_are_rejected() {
    let toml = TOML_OBS.replace("\"CS002\"", "\"CS002 \"");
    let tmp_file = write_tmp(&toml, ".toml");
    assert!(matches!(
        Observation::read(tmp_file.path()),
        Err(ObservationError::BadName { thing: "station", ref name }) if name == "CS002 "
    ));

    let toml = TOML_OBS.replace("\"D0\"", "\"\"");
    let tmp_file = write_tmp(&toml, ".toml");
    assert!(matches!(
        Observation::read(tmp_file.path()),
        Err(ObservationError::BadName { thing: "direction", ref name }) if name.is_empty()
    ));

    // Whitespace inside a name is fine.
    let toml = TOML_OBS.replace("\"D0\"", "\"3C 196\"");
    let tmp_file = write_tmp(&toml, ".toml");
    let obs = Observation::read(tmp_file.path()).unwrap();
    assert_eq!(obs.directions[1].name, "3C 196");
}

#[test]
fn test_timestamps_must_increase() {
    let stations = || {
        vec![Station {
            name: "A".to_string(),
            position: XyzGeocentric {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
        }]
    };
    let directions = || vec![SkyDirection {
        name: "D".to_string(),
        radec: RADec::from_degrees(10.0, -20.0),
    }];
    let start = Epoch::from_mjd_utc(5.0e9 / DAYSEC);
    let s = Duration::from_seconds;

    let result = Observation::new(
        stations(),
        directions(),
        Some(vec![start, start + s(10.0), start + s(5.0)]),
        None,
    );
    assert!(matches!(
        result,
        Err(ObservationError::UnorderedTimestamps {
            index: 2,
            prev_index: 1,
            ..
        })
    ));

    let result = Observation::new(stations(), directions(), Some(vec![start, start]), None);
    assert!(matches!(
        result,
        Err(ObservationError::UnorderedTimestamps { index: 1, .. })
    ));

    let result = Observation::new(
        stations(),
        directions(),
        Some(vec![start, start + s(10.0), start + s(20.0)]),
        None,
    );
    assert!(result.is_ok(), "{:?}", result.err());
}
