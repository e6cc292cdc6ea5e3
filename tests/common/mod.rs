//! Shared test utilities for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use cubeview::{parser, Catalog, DataCube};

/// Load a catalog fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> Catalog {
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// The cube catalog every integration test shares
pub fn catalog() -> Catalog {
    load_fixture("cubes.yaml")
}

/// Look up one cube from the shared catalog
pub fn cube(name: &str) -> Arc<DataCube> {
    catalog()
        .data_cube(name)
        .unwrap_or_else(|| panic!("cube '{}' missing from cubes.yaml", name))
}

/// Read a YAML fixture that is not a catalog
pub fn load_yaml<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let path = format!("tests/test_data/{}", name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
    serde_yaml::from_str(&text).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e))
}
