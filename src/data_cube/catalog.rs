//! Root catalog of data cubes

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use super::cube::DataCube;
use crate::error::ParseError;
use crate::time::parse_timezone;

/// The root catalog containing every explorable cube
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(rename = "dataCubes")]
    pub data_cubes: Vec<DataCube>,
}

impl Catalog {
    /// Load a catalog from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        crate::parser::parse_file(path)
    }

    /// Get a data cube by name
    pub fn get_data_cube(&self, name: &str) -> Option<&DataCube> {
        self.data_cubes.iter().find(|c| c.name == name)
    }

    /// Get a shareable handle to a data cube, as held by an Essence
    pub fn data_cube(&self, name: &str) -> Option<Arc<DataCube>> {
        self.get_data_cube(name).cloned().map(Arc::new)
    }

    /// Get all cube names in declaration order
    pub fn data_cube_names(&self) -> Vec<&str> {
        self.data_cubes.iter().map(|c| c.name.as_str()).collect()
    }

    /// Check cross-references the YAML structure alone cannot express
    pub fn validate(&self) -> Result<(), ParseError> {
        let mut cube_names = HashSet::new();
        for cube in &self.data_cubes {
            if !cube_names.insert(cube.name.as_str()) {
                return Err(invalid(&cube.name, "duplicate data cube name".to_string()));
            }

            let mut dimension_names = HashSet::new();
            for dimension in &cube.dimensions {
                if !dimension_names.insert(dimension.name.as_str()) {
                    return Err(invalid(
                        &cube.name,
                        format!("duplicate dimension '{}'", dimension.name),
                    ));
                }
            }
            let mut measure_names = HashSet::new();
            for measure in &cube.measures {
                if !measure_names.insert(measure.name.as_str()) {
                    return Err(invalid(
                        &cube.name,
                        format!("duplicate measure '{}'", measure.name),
                    ));
                }
            }

            if let Some(tz) = &cube.default_timezone {
                parse_timezone(tz).map_err(|e| invalid(&cube.name, e.to_string()))?;
            }
            if let Some(time) = &cube.time_attribute {
                if cube.time_dimension().is_none() {
                    return Err(invalid(
                        &cube.name,
                        format!("timeAttribute '{}' is not a time dimension", time),
                    ));
                }
            }
            if let Some(sort) = &cube.default_sort_measure {
                if cube.get_measure(sort).is_none() {
                    return Err(invalid(
                        &cube.name,
                        format!("defaultSortMeasure '{}' is not a measure", sort),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn invalid(cube: &str, message: String) -> ParseError {
    ParseError::InvalidCube {
        cube: cube.to_string(),
        message,
    }
}
