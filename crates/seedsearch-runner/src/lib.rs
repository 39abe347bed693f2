//! Process execution for solver and worker invocations
//!
//! Every external program (the ASP solver, the flux oracle command, the isolated
//! guess-and-validate worker) is started through [`CommandSpec`] and executed by a
//! [`ProcessRunner`] under a wall-clock deadline.
//!
//! # Deadline Model
//!
//! A run that exceeds its deadline is killed together with its process group and
//! reported as `timed_out`. Whatever the child flushed to stdout before the kill is
//! still returned, so callers can salvage truncated solver output.

pub mod command_spec;
pub mod error;
pub mod memory;
pub mod native;
pub mod process;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use memory::peak_children_memory_gb;
pub use native::NativeRunner;
pub use process::{ProcessOutput, ProcessRunner};
