//! Spawn a child process and talk to it over its standard streams.
//!
//! ```rust,no_run
//! use std::io::Read;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut process = pipeproc::create(&["echo", "hello"])?;
//!
//! let mut out = String::new();
//! process.stdout()?.read_to_string(&mut out)?;
//! assert_eq!(out, "hello\n");
//!
//! assert_eq!(process.join()?, 0);
//! process.destroy()?;
//! # Ok(())
//! # }
//! ```
//!
//! The backend is chosen at compile time; see [`PlatformProcess`].

mod platform;

pub use platform::{PlatformProcess, platform_name};

// Re-export core functionality
pub use pipeproc_core::*;

/// A child process on the current platform
pub type Process = pipeproc_core::Process<PlatformProcess>;

/// Spawn a child from a sequence whose first element is the executable
///
/// The remaining elements are its arguments. On Windows they are joined with
/// single spaces and passed as one command line, without any quoting.
pub fn create<S: AsRef<str>>(command_line: &[S]) -> Result<Process> {
    Process::create(command_line)
}

/// Write end of the child's standard input
pub fn stdin_stream(process: &Process) -> Result<&ChildStdin> {
    process.stdin()
}

/// Read end of the child's standard output
pub fn stdout_stream(process: &Process) -> Result<&ChildStdout> {
    process.stdout()
}

/// Read end of the child's standard error
pub fn stderr_stream(process: &Process) -> Result<&ChildStderr> {
    process.stderr()
}

/// Close the child's stdin and block until it exits, returning its exit code
pub fn join(process: &mut Process) -> Result<i32> {
    process.join()
}

/// Release the streams and the native reference without killing the child
pub fn destroy(process: &mut Process) -> Result<()> {
    process.destroy()
}
