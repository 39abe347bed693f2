//! Command-line interface for seedsearch
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations and helpers
//! - `tests`: Test module (cfg(test) only)

pub mod args;
mod commands;
mod run;


pub use args::{Cli, Commands, SearchArgs};
pub use run::run;
