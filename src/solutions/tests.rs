// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use marlu::{RADec, XyzGeocentric};
use ndarray::prelude::*;

use super::*;
use crate::tec::TecAxes;

fn make_table(num_dirs: usize, history: &[&str]) -> SolutionTable {
    let (num_times, num_ants, num_freqs) = (3, 4, 2);
    let stations: Vec<Station> = (0..num_ants)
        .map(|i| Station {
            name: format!("CS{i:03}HBA0"),
            position: XyzGeocentric {
                x: 3826923.5 + i as f64,
                y: 460915.4 - i as f64,
                z: 5064643.5 + 0.5 * i as f64,
            },
        })
        .collect();
    let directions: Vec<SkyDirection> = (0..num_dirs)
        .map(|i| SkyDirection {
            // Deliberately not sorted.
            name: format!("patch_{}", num_dirs - i),
            radec: RADec::from_degrees(10.0 * i as f64, -20.0 + i as f64),
        })
        .collect();
    let dim = (num_times, num_ants, num_dirs, num_freqs);
    let values = Array4::from_shape_fn(dim, |(t, a, d, f)| {
        t as f64 * 0.5 - a as f64 * 0.25 + d as f64 * 1.125 + f as f64 * 1e-3
    });
    let mut weights = Array4::ones(dim);
    weights.slice_mut(s![.., 1, .., ..]).fill(0.0);
    let tec = TecValues {
        values,
        weights,
        axes: TecAxes {
            times: (0..num_times).map(|i| 5.0e9 + 10.0 * i as f64).collect(),
            antennas: stations.iter().map(|s| s.name.clone()).collect(),
            directions: directions.iter().map(|d| d.name.clone()).collect(),
            freqs: (0..num_freqs).map(|i| 120e6 + 1e6 * i as f64).collect(),
        },
    };
    SolutionTable::new(
        tec,
        &stations,
        &directions,
        history.iter().map(|h| h.to_string()).collect(),
    )
}

fn assert_tables_eq(expected: &SolutionTable, result: &SolutionTable) {
    assert_eq!(expected.solset, result.solset);
    assert_eq!(expected.soltab, result.soltab);
    assert_eq!(expected.tec.values, result.tec.values);
    assert_eq!(expected.tec.weights, result.tec.weights);
    assert_eq!(expected.tec.axes, result.tec.axes);
    assert_eq!(expected.history, result.history);

    assert_eq!(expected.antennas.len(), result.antennas.len());
    for (e, r) in expected.antennas.iter().zip(result.antennas.iter()) {
        assert_eq!(e.name, r.name);
        assert_abs_diff_eq!(e.position.x, r.position.x);
        assert_abs_diff_eq!(e.position.y, r.position.y);
        assert_abs_diff_eq!(e.position.z, r.position.z);
    }
    assert_eq!(expected.directions.len(), result.directions.len());
    for (e, r) in expected.directions.iter().zip(result.directions.iter()) {
        assert_eq!(e.name, r.name);
        assert_abs_diff_eq!(e.radec.ra, r.radec.ra, epsilon = 1e-12);
        assert_abs_diff_eq!(e.radec.dec, r.radec.dec, epsilon = 1e-12);
    }
}

#[test]
fn test_write_and_read_solution_table() {
    let long_entry = "x".repeat(200);
    let table = make_table(3, &["first entry", long_entry.as_str()]);

    let tmp_dir = tempfile::tempdir().expect("Couldn't make tmp dir");
    let file = tmp_dir.path().join("tec.fits");
    let result = table.write(&file);
    assert!(result.is_ok(), "{:?}", result.err());

    let result = SolutionTable::read(&file);
    assert!(result.is_ok(), "{:?}", result.err());
    let from_disk = result.unwrap();
    assert_tables_eq(&table, &from_disk);
    assert_eq!(from_disk.solset, "sol000");
    assert_eq!(from_disk.soltab, "tec000");
    assert_eq!(from_disk.history[1].len(), 200);
    assert_eq!(from_disk.tec.axes.directions, ["patch_3", "patch_2", "patch_1"]);
}

#[test]
fn test_custom_soltab_name() {
    let table = make_table(1, &[]).with_soltab("tec001");
    let tmp_dir = tempfile::tempdir().expect("Couldn't make tmp dir");
    let file = tmp_dir.path().join("tec.fits");
    table.write(&file).unwrap();
    let from_disk = SolutionTable::read(&file).unwrap();
    assert_eq!(from_disk.soltab, "tec001");
    assert!(from_disk.history.is_empty());

    for bad in ["", "WEIGHTS", "has space"] {
        let result = make_table(1, &[]).with_soltab(bad).write(&file);
        assert!(
            matches!(result, Err(SolutionsWriteError::BadSoltabName(_))),
            "{bad}"
        );
    }
}

#[test]
fn test_existing_table_is_replaced() {
    let tmp_dir = tempfile::tempdir().expect("Couldn't make tmp dir");
    let file = tmp_dir.path().join("tec.fits");
    make_table(5, &["old run"]).write(&file).unwrap();

    let new = make_table(2, &[]);
    let result = persist(
        &file,
        new.tec.clone(),
        &new.antennas,
        &new.directions,
        "tec000",
        &TecSource::Wave,
    );
    assert!(result.is_ok(), "{:?}", result.err());
    let written = result.unwrap();

    let from_disk = SolutionTable::read(&file).unwrap();
    assert_tables_eq(&written, &from_disk);
    assert_eq!(from_disk.directions.len(), 2);
    assert_eq!(from_disk.history.len(), 1);
    assert!(from_disk.history[0].starts_with("CREATE (by TEC operation of"));
    assert!(from_disk.history[0].ends_with("and wave)"));

    // Nothing but the table is left behind.
    let num_entries = std::fs::read_dir(tmp_dir.path()).unwrap().count();
    assert_eq!(num_entries, 1);
}

#[test]
fn test_failed_write_keeps_existing_table() {
    let tmp_dir = tempfile::tempdir().expect("Couldn't make tmp dir");
    let file = tmp_dir.path().join("tec.fits");
    let old = make_table(2, &["old run"]);
    old.write(&file).unwrap();

    let mut bad = make_table(3, &[]);
    bad.directions.pop();
    let result = bad.write(&file);
    assert!(matches!(
        result,
        Err(SolutionsWriteError::Inconsistent {
            thing: "direction table",
            expected: 3,
            actual: 2
        })
    ));
    assert_tables_eq(&old, &SolutionTable::read(&file).unwrap());
    assert_eq!(std::fs::read_dir(tmp_dir.path()).unwrap().count(), 1);
}

#[test]
fn test_write_to_missing_directory() {
    let tmp_dir = tempfile::tempdir().expect("Couldn't make tmp dir");
    let file = tmp_dir.path().join("does").join("not").join("exist.fits");
    let result = make_table(1, &[]).write(&file);
    assert!(matches!(result, Err(SolutionsWriteError::IO(_))));
    assert!(!file.exists());
}

#[test]
fn test_creation_entry() {
    assert_eq!(
        creation_entry(
            Path::new("/data/obs.ms/tec.fits"),
            &TecSource::Cube(PathBuf::from("tec_cube.fits"))
        ),
        "CREATE (by TEC operation of tecsim from obs /data/obs.ms/tec.fits and FITS cube tec_cube.fits)"
    );
    assert_eq!(
        creation_entry(Path::new("tec.fits"), &TecSource::Wave),
        "CREATE (by TEC operation of tecsim from obs tec.fits and wave)"
    );
}
