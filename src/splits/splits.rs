//! Ordered, reference-unique collection of splits

use super::granularity::{best_number_bucket, best_time_bucket, default_bucket};
use super::sort::Sort;
use super::split::Split;
use crate::data_cube::{DataCube, DimensionKind};
use crate::filter::{Clause, Filter};
use crate::series::SeriesList;

/// The user's splits. Order defines nesting; references are unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Splits {
    splits: Vec<Split>,
}

impl Splits {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build splits, keeping the first split per reference
    pub fn from_splits(splits: Vec<Split>) -> Self {
        let mut unique: Vec<Split> = Vec::with_capacity(splits.len());
        for split in splits {
            if !unique.iter().any(|s| s.reference == split.reference) {
                unique.push(split);
            }
        }
        Splits { splits: unique }
    }

    pub fn from_split(split: Split) -> Self {
        Splits {
            splits: vec![split],
        }
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn iter(&self) -> impl Iterator<Item = &Split> {
        self.splits.iter()
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Split> {
        self.splits.get(index)
    }

    pub fn index_of(&self, reference: &str) -> Option<usize> {
        self.splits.iter().position(|s| s.reference == reference)
    }

    pub fn find_split_for_reference(&self, reference: &str) -> Option<&Split> {
        self.splits.iter().find(|s| s.reference == reference)
    }

    pub fn has_split_on(&self, reference: &str) -> bool {
        self.index_of(reference).is_some()
    }

    /// Kinds of all splits, outermost first
    pub fn kinds(&self) -> Vec<DimensionKind> {
        self.splits.iter().map(|s| s.kind).collect()
    }

    /// Append a split; an existing split on the same dimension moves to the end
    pub fn add_split(&self, split: Split) -> Splits {
        self.insert_by_index(self.splits.len(), split)
    }

    pub fn remove_split(&self, reference: &str) -> Splits {
        Splits {
            splits: self
                .splits
                .iter()
                .filter(|s| s.reference != reference)
                .cloned()
                .collect(),
        }
    }

    /// Replace the split on `original`'s dimension
    pub fn replace(&self, original: &Split, split: Split) -> Splits {
        match self.index_of(&original.reference) {
            Some(index) => self.replace_by_index(index, split),
            None => {
                debug_assert!(false, "split on '{}' not found", original.reference);
                self.clone()
            }
        }
    }

    /// Put `split` at `index`. If a split on the same dimension sits at
    /// another index, the two trade places. Replacing one past the end
    /// appends.
    pub fn replace_by_index(&self, index: usize, split: Split) -> Splits {
        if index >= self.splits.len() {
            return self.insert_by_index(index, split);
        }
        let mut splits = self.splits.clone();
        match self.index_of(&split.reference) {
            Some(existing) if existing != index => {
                let displaced = splits[index].clone();
                splits[existing] = displaced;
                splits[index] = split;
            }
            _ => splits[index] = split,
        }
        Splits { splits }
    }

    /// Insert `split` before `index`, dropping a split on the same dimension
    /// found elsewhere
    pub fn insert_by_index(&self, index: usize, split: Split) -> Splits {
        let mut splits = self.splits.clone();
        let existing = self.index_of(&split.reference);
        let index = index.min(splits.len());
        splits.insert(index, split);
        if let Some(existing) = existing {
            let stale = if existing >= index { existing + 1 } else { existing };
            splits.remove(stale);
        }
        Splits { splits }
    }

    /// Give unbucketed continuous splits a bucket that fits the filtered range.
    ///
    /// Fixed clauses contribute their first range; relative time clauses
    /// contribute the nominal length of their duration. Dimensions without a
    /// range clause get their default granularity.
    pub fn update_with_filter(&self, filter: &Filter, data_cube: &DataCube) -> Splits {
        Splits {
            splits: self
                .splits
                .iter()
                .map(|split| {
                    if split.bucket.is_some() {
                        return split.clone();
                    }
                    let Some(dimension) = data_cube.get_dimension(&split.reference) else {
                        return split.clone();
                    };
                    if !dimension.can_bucket_by_default() {
                        return split.clone();
                    }
                    let from_filter = match filter.clause_for_reference(&split.reference) {
                        Some(Clause::FixedTime(c)) => c
                            .ranges
                            .first()
                            .map(|r| best_time_bucket(r.length_millis(), dimension)),
                        Some(Clause::RelativeTime(c)) => {
                            Some(best_time_bucket(c.duration.approximate_millis(), dimension))
                        }
                        Some(Clause::Number(c)) => c
                            .ranges
                            .first()
                            .and_then(|r| r.span())
                            .map(|span| best_number_bucket(span, dimension)),
                        _ => None,
                    };
                    split.change_bucket(from_filter.or_else(|| default_bucket(dimension)))
                })
                .collect(),
        }
    }

    /// Clear buckets so `update_with_filter` recomputes them
    pub fn remove_bucketing_from(&self, references: &[String]) -> Splits {
        Splits {
            splits: self
                .splits
                .iter()
                .map(|split| {
                    if split.bucket.is_some() && references.contains(&split.reference) {
                        split.change_bucket(None)
                    } else {
                        split.clone()
                    }
                })
                .collect(),
        }
    }

    /// Re-point sorts on the series `from` to `to`
    pub fn change_sort_if_on_series(&self, from: &str, to: Option<Sort>) -> Splits {
        Splits {
            splits: self
                .splits
                .iter()
                .map(|split| match &split.sort {
                    Some(Sort::Series(sort)) if sort.reference == from => {
                        split.change_sort(to.clone())
                    }
                    _ => split.clone(),
                })
                .collect(),
        }
    }

    /// Drop splits on unknown dimensions and splits sorting on something
    /// that no longer exists
    pub fn constrain_to_dimensions_and_series(
        &self,
        data_cube: &DataCube,
        series: &SeriesList,
    ) -> Splits {
        Splits {
            splits: self
                .splits
                .iter()
                .filter(|split| {
                    if data_cube.get_dimension(&split.reference).is_none() {
                        tracing::debug!(
                            reference = %split.reference,
                            data_cube = %data_cube.name,
                            "dropping split on unknown dimension"
                        );
                        return false;
                    }
                    let sort_valid = match &split.sort {
                        None => true,
                        Some(Sort::Dimension(sort)) => {
                            data_cube.get_dimension(&sort.reference).is_some()
                        }
                        Some(Sort::Series(sort)) => series.has_series_with_key(&sort.reference),
                    };
                    if !sort_valid {
                        tracing::debug!(
                            reference = %split.reference,
                            "dropping split sorted on a missing target"
                        );
                    }
                    sort_valid
                })
                .cloned()
                .collect(),
        }
    }
}
