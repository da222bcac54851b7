// src/process/mod.rs

//! External process execution.
//!
//! - [`arguments`] turns declarative argument descriptors into the command
//!   line string (the wire contract for any invoked program).
//! - [`supervisor`] launches the process with `tokio::process::Command`,
//!   captures both output streams concurrently and kills the child when the
//!   module is cancelled.

pub mod arguments;
pub mod supervisor;

pub use arguments::{
    ArgumentDescriptor, ArgumentSpec, CommandLine, describe, format_arguments, order_arguments,
    quote_value, split_arguments,
};
pub use supervisor::{ProcessExit, ProcessRequest, ProcessState, ProcessSupervisor};
