//! Impulsive transfer utilities.

pub mod transfers;

pub use transfers::{HohmannResult, hohmann};
