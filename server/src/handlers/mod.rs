//! Request handlers for location queries.

mod locations;

pub use locations::*;
