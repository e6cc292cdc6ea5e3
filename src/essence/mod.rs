//! The immutable view state of one exploration
//!
//! Every user action produces a new [`Essence`]; splits, series and
//! visualization changes re-run the rules engine so the result stays
//! renderable whenever any visualization can render it.

#[allow(clippy::module_inception)]
mod essence;
mod strategy;

pub use essence::{EffectiveFilterOptions, Essence, EssenceParams};
pub use strategy::VisStrategy;
