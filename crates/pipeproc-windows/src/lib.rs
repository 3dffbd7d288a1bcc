//! Windows-specific process backend
//!
//! Pipes come from `CreatePipe`, the child is launched with `CreateProcessW`
//! from the space-joined command line, and the process handle is used to
//! wait for it and query its exit code.

mod windows_process;

pub use windows_process::WindowsProcess;

pub fn platform_name() -> &'static str {
    "Windows"
}
