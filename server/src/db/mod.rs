//! Database module for PostgreSQL persistence.

mod locations;
mod pool;

pub use locations::*;
pub use pool::*;
