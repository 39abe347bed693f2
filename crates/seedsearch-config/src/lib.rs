//! Configuration for seedsearch
//!
//! Hierarchical configuration with discovery and precedence CLI > file >
//! defaults. See [`Config`] for the file format.

pub mod config;

pub use config::{CliArgs, Config, ConfigBuilder, ConfigSource};
