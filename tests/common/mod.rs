//! Shared helpers for the integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use urlshort::{Config, PathUrl, Store};

/// A fresh store file in its own temp directory
pub fn setup_temp_store() -> (TempDir, PathBuf, Store) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bolt.db");
    let store = Store::open(&path).unwrap();
    (temp_dir, path, store)
}

/// Shorthand for a list of mappings
pub fn pairs(items: &[(&str, &str)]) -> Vec<PathUrl> {
    items.iter().map(|(p, u)| PathUrl::new(*p, *u)).collect()
}

/// Write YAML and JSON path maps and return a config pointing at them
#[allow(dead_code)]
pub fn write_maps(dir: &Path, yaml: &str, json: &str) -> Config {
    let yaml_path = dir.join("map.yaml");
    let json_path = dir.join("map.json");
    fs::write(&yaml_path, yaml).unwrap();
    fs::write(&json_path, json).unwrap();

    Config::builder()
        .store_path(dir.join("bolt.db"))
        .yaml_path(yaml_path)
        .json_path(json_path)
        .build()
}

/// Read a value as a string, `None` if absent
#[allow(dead_code)]
pub fn get_str(store: &Store, bucket: &str, key: &str) -> Option<String> {
    store
        .get(bucket, key.as_bytes())
        .unwrap()
        .map(|v| String::from_utf8(v).unwrap())
}
