//! Filter model: typed clauses and the ordered filter built from them

mod clause;
mod error;
#[allow(clippy::module_inception)]
mod filter;

pub use clause::{
    BooleanClause, BooleanValue, Bounds, Clause, ClausePredicate, DateRange, FilterValue,
    FixedTimeClause, NumberClause, NumberRange, RelativeTimeClause, StringAction, StringClause,
    TimePeriod,
};
pub use error::ClauseError;
pub use filter::Filter;
