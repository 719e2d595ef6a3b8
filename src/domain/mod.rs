mod aggregation;
mod amount;
mod day;
mod expense;

pub use aggregation::*;
pub use amount::*;
pub use day::*;
pub use expense::*;
