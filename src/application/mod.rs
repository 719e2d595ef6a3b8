// Application layer: boundary validation, then storage, then the pure
// aggregation functions from the domain.

pub mod error;
mod service;

pub use error::*;
pub use service::*;
