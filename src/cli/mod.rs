//! Command-line interface for irsight.

mod commands;

pub use commands::{is_verbose, run};
