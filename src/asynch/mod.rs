//! Async glue on top of the polling engine, built on `embassy-time`.

mod pwr;
mod runner;

pub use pwr::{bring_up, Board};
pub use runner::Runner;
