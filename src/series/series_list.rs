//! Ordered, key-unique list of series

use super::series::Series;
use crate::data_cube::DataCube;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesList {
    series: Vec<Series>,
}

impl SeriesList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// One plain series per measure name
    pub fn from_measures<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_series(names.into_iter().map(Series::from_measure).collect())
    }

    /// Build a list, keeping the first series per key
    pub fn from_series(series: Vec<Series>) -> Self {
        let mut unique: Vec<Series> = Vec::with_capacity(series.len());
        for s in series {
            if !unique.iter().any(|u| u.key() == s.key()) {
                unique.push(s);
            }
        }
        SeriesList { series: unique }
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.series.iter().map(Series::key).collect()
    }

    pub fn first(&self) -> Option<&Series> {
        self.series.first()
    }

    pub fn get_series_with_key(&self, key: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.key() == key)
    }

    pub fn has_series_with_key(&self, key: &str) -> bool {
        self.get_series_with_key(key).is_some()
    }

    /// Check if the list holds a plain series on a measure
    pub fn has_measure_series(&self, reference: &str) -> bool {
        self.series
            .iter()
            .any(|s| matches!(s, Series::Measure(m) if m.reference == reference))
    }

    /// Check if any series is computed from a measure
    pub fn has_measure(&self, reference: &str) -> bool {
        self.series.iter().any(|s| s.reference() == reference)
    }

    /// Append a series unless one with the same key exists
    pub fn add_series(&self, series: Series) -> SeriesList {
        if self.has_series_with_key(&series.key()) {
            return self.clone();
        }
        let mut list = self.series.clone();
        list.push(series);
        SeriesList { series: list }
    }

    pub fn remove_series(&self, key: &str) -> SeriesList {
        SeriesList {
            series: self.series.iter().filter(|s| s.key() != key).cloned().collect(),
        }
    }

    /// Swap the series with `key` for another, keeping its position
    pub fn replace_series(&self, key: &str, series: Series) -> SeriesList {
        match self.series.iter().position(|s| s.key() == key) {
            Some(index) => self.replace_by_index(index, series),
            None => {
                debug_assert!(false, "series '{}' not found", key);
                self.clone()
            }
        }
    }

    /// Put `series` at `index`; a series with the same key elsewhere is dropped
    pub fn replace_by_index(&self, index: usize, series: Series) -> SeriesList {
        if index >= self.series.len() {
            return self.insert_by_index(index, series);
        }
        let key = series.key();
        let mut list = self.series.clone();
        list[index] = series;
        let list = list
            .into_iter()
            .enumerate()
            .filter(|(i, s)| *i == index || s.key() != key)
            .map(|(_, s)| s)
            .collect();
        SeriesList { series: list }
    }

    /// Insert `series` before `index`; a series with the same key elsewhere is dropped
    pub fn insert_by_index(&self, index: usize, series: Series) -> SeriesList {
        let key = series.key();
        let index = index.min(self.series.len());
        let mut list = self.series.clone();
        list.insert(index, series);
        let list = list
            .into_iter()
            .enumerate()
            .filter(|(i, s)| *i == index || s.key() != key)
            .map(|(_, s)| s)
            .collect();
        SeriesList { series: list }
    }

    /// Drop series computed from measures the cube no longer has
    pub fn constrain_to_measures(&self, data_cube: &DataCube) -> SeriesList {
        SeriesList {
            series: self
                .series
                .iter()
                .filter(|s| {
                    let known = s
                        .measure_references()
                        .iter()
                        .all(|m| data_cube.get_measure(m).is_some());
                    if !known {
                        tracing::debug!(
                            series = %s.key(),
                            data_cube = %data_cube.name,
                            "dropping series on unknown measure"
                        );
                    }
                    known
                })
                .cloned()
                .collect(),
        }
    }
}
