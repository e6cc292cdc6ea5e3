//! Bucket sizes for continuous splits

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::Duration;

/// Bucket size: a number width for number splits, a duration for time splits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bucket {
    Number(f64),
    Duration(Duration),
}

impl Bucket {
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Bucket::Duration(d) => Some(d),
            Bucket::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Bucket::Number(n) => Some(*n),
            Bucket::Duration(_) => None,
        }
    }

    /// Comparable magnitude: milliseconds for durations, the width for numbers
    pub(crate) fn magnitude(&self) -> f64 {
        match self {
            Bucket::Number(n) => *n,
            Bucket::Duration(d) => d.approximate_millis() as f64,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Number(n) => write!(f, "{}", n),
            Bucket::Duration(d) => write!(f, "{}", d),
        }
    }
}
