//! Outcome of checking a visualization against the current state

use std::cmp::Ordering;

use crate::series::SeriesList;
use crate::splits::Splits;

/// Partial patch applied to an Essence to make it renderable
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Adjustment {
    pub splits: Option<Splits>,
    pub series: Option<SeriesList>,
}

impl Adjustment {
    pub fn splits(splits: Splits) -> Self {
        Self {
            splits: Some(splits),
            series: None,
        }
    }

    pub fn series(series: SeriesList) -> Self {
        Self {
            splits: None,
            series: Some(series),
        }
    }
}

/// A named one-click fix offered for a manual resolve
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub description: String,
    pub adjustment: Adjustment,
}

impl Resolution {
    pub fn new(description: impl Into<String>, adjustment: Adjustment) -> Self {
        Self {
            description: description.into(),
            adjustment,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolve {
    /// Renderable as is
    Ready { score: u32 },
    /// Renderable once `adjustment` is applied; applied silently
    Automatic { score: u32, adjustment: Adjustment },
    /// Not renderable; the user picks one of `resolutions`
    Manual {
        priority: u32,
        message: String,
        resolutions: Vec<Resolution>,
    },
    /// The visualization can never render this cube
    Never,
}

impl Resolve {
    pub fn ready(score: u32) -> Self {
        Resolve::Ready { score }
    }

    pub fn automatic(score: u32, adjustment: Adjustment) -> Self {
        Resolve::Automatic { score, adjustment }
    }

    pub fn manual(priority: u32, message: impl Into<String>, resolutions: Vec<Resolution>) -> Self {
        Resolve::Manual {
            priority,
            message: message.into(),
            resolutions,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resolve::Ready { .. })
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self, Resolve::Automatic { .. })
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Resolve::Manual { .. })
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Resolve::Never)
    }

    /// Ready or fixable without asking the user
    pub fn is_renderable(&self) -> bool {
        self.is_ready() || self.is_automatic()
    }

    pub fn adjustment(&self) -> Option<&Adjustment> {
        match self {
            Resolve::Automatic { adjustment, .. } => Some(adjustment),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Resolve::Manual { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn resolutions(&self) -> &[Resolution] {
        match self {
            Resolve::Manual { resolutions, .. } => resolutions,
            _ => &[],
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Resolve::Ready { .. } => 3,
            Resolve::Automatic { .. } => 2,
            Resolve::Manual { .. } => 1,
            Resolve::Never => 0,
        }
    }

    /// Score within the rank; priority for manual resolves
    pub fn score(&self) -> u32 {
        match self {
            Resolve::Ready { score } | Resolve::Automatic { score, .. } => *score,
            Resolve::Manual { priority, .. } => *priority,
            Resolve::Never => 0,
        }
    }

    /// Order resolves best first: Ready > Automatic > Manual > Never, then
    /// by descending score
    pub fn compare(a: &Resolve, b: &Resolve) -> Ordering {
        b.rank()
            .cmp(&a.rank())
            .then_with(|| b.score().cmp(&a.score()))
    }
}
