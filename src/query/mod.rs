//! What the core hands to a query backend
//!
//! The backend itself is opaque; the core only guarantees that everything
//! in a [`QueryDescription`] is evaluated and valid.

mod description;
mod error;

pub use description::{QueryBackend, QueryDescription};
pub use error::QueryError;
