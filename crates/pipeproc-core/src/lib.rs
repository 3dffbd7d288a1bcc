//! pipeproc core - Platform-independent process handle
//!
//! This crate provides the process handle, its lifecycle state machine, the
//! error types and the command line configuration shared by the
//! platform-specific backends.

mod config;
mod error;
mod process;
mod stdio;

pub use config::*;
pub use error::*;
pub use process::*;
pub use stdio::*;
