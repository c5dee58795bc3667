// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! End-to-end tests of `tecsim beam`.

use tempfile::TempDir;

use tecsim::{parset::keys, ParameterSet, ParsetValue};

use crate::{get_cmd_output, tecsim};

#[test]
fn test_beam_keys_are_written() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let parset = tmp_dir.path().join("predict.json");
    let mut existing = ParameterSet::new();
    existing.set(keys::APPLYCAL_STEPS, vec!["tec".to_string()]);
    existing.write(&parset).unwrap();

    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "beam",
            "--mode", "element",
            "--no-channel-freq",
            "--one-beam-per-patch",
            "--parameters", &format!("{}", parset.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "beam failed: {}", cmd.err().unwrap());

    let parset = ParameterSet::read(&parset).unwrap();
    assert_eq!(parset.len(), 5);
    assert_eq!(
        parset.get(keys::APPLYCAL_STEPS),
        Some(&ParsetValue::List(vec!["tec".to_string()]))
    );
    assert_eq!(
        parset.get(keys::USE_BEAM_MODEL),
        Some(&ParsetValue::Bool(true))
    );
    assert_eq!(
        parset.get(keys::BEAM_MODE),
        Some(&ParsetValue::Str("element".to_string()))
    );
    assert_eq!(
        parset.get(keys::USE_CHANNEL_FREQ),
        Some(&ParsetValue::Bool(false))
    );
    assert_eq!(
        parset.get(keys::ONE_BEAM_PER_PATCH),
        Some(&ParsetValue::Bool(true))
    );
}

#[test]
fn test_unknown_beam_mode() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let parset = tmp_dir.path().join("predict.toml");

    #[rustfmt::skip]
    let cmd = tecsim()
        .args([
            "beam",
            "--mode", "full_jones",
            "--parameters", &format!("{}", parset.display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("full_jones"), "{stderr}");
    assert!(!parset.exists());
}
