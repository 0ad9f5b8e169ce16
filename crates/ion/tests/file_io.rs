// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! File helpers: to_file / from_file, explicit writers and readers, config.

use std::fs;

use ion::{IonBundle, IonBundled, IonConfig, IonError, IonValue, Result};
use tempfile::tempdir;

#[derive(Debug, Clone, Default, PartialEq)]
struct Settings {
    volume: u8,
    fullscreen: bool,
    recent: Vec<String>,
}

impl IonBundled for Settings {
    fn save(&self, bundle: &mut IonBundle) -> Result<()> {
        bundle.put_byte("volume", self.volume);
        bundle.put_bool("fullscreen", self.fullscreen);
        bundle.put_strings("recent", self.recent.clone());
        Ok(())
    }

    fn load(&mut self, bundle: &IonBundle) -> Result<()> {
        self.volume = bundle.get_byte("volume", 100);
        self.fullscreen = bundle.get_bool("fullscreen", false);
        self.recent = bundle.get_strings("recent", Vec::new());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NotRegistered;

fn setup() {
    ion::register_bundled::<Settings>(80).unwrap();
}

#[test]
fn registered_object_to_file_and_back() {
    setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.ion");

    let settings = Settings {
        volume: 70,
        fullscreen: true,
        recent: vec!["a.sav".into(), "b.sav".into()],
    };
    ion::to_file(&path, &IonValue::object(settings.clone())).unwrap();

    let loaded = ion::from_file(&path).unwrap();
    assert_eq!(loaded.downcast_ref::<Settings>(), Some(&settings));
}

#[test]
fn several_values_in_one_file() {
    setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("multi.ion");
    let config = IonConfig::default();

    {
        let mut out = ion::create_output(&path, config.clone()).unwrap();
        out.write_object(&IonValue::Int(1)).unwrap();
        out.write_object(&IonValue::from("two")).unwrap();
        out.write_long(3).unwrap();
        out.close().unwrap();
    }

    let mut input = ion::open_input(&path, config).unwrap();
    assert_eq!(input.read_object().unwrap(), IonValue::Int(1));
    assert_eq!(input.read_typed::<String>().unwrap(), "two");
    assert_eq!(input.read_long().unwrap(), 3);
    assert!(matches!(input.read_object(), Err(IonError::Io(_))));
    input.close().unwrap();
}

#[test]
fn failed_write_releases_file() {
    setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.ion");

    let value = IonValue::Sequence(vec![IonValue::Int(1), IonValue::object(NotRegistered)]);
    let err = ion::to_file(&path, &value).unwrap_err();
    assert!(matches!(err, IonError::Unsupported(_)));

    // the handle is gone; the path can be removed and rewritten
    fs::remove_file(&path).unwrap();
    ion::to_file(&path, &IonValue::Bool(true)).unwrap();
    assert!(ion::from_file_as::<bool, _>(&path).unwrap());
}

#[test]
fn truncated_file_is_reported() {
    setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.ion");
    fs::write(&path, [ion::mark::DOUBLE, 0x40]).unwrap();

    let err = ion::from_file(&path).unwrap_err();
    assert!(matches!(err, IonError::Io(_)));
}

#[test]
fn config_from_toml_file_limits_decoding() {
    setup();
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("ion.toml");
    fs::write(&config_path, "max_depth = 3\nbuffer_size = 64\n").unwrap();
    let config = IonConfig::from_file(&config_path).unwrap();
    assert_eq!(config.max_depth, 3);

    let mut value = IonValue::Int(0);
    for _ in 0..5 {
        value = IonValue::Sequence(vec![value]);
    }
    let data_path = dir.path().join("deep.ion");
    ion::to_file(&data_path, &value).unwrap();

    assert_eq!(ion::from_file(&data_path).unwrap(), value);
    let err = ion::from_file_with(&data_path, config).unwrap_err();
    assert!(err.is_corrupt_data());
}
