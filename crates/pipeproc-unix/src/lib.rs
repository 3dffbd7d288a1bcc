//! Unix-specific process backend
//!
//! Pipes come from `pipe2(O_CLOEXEC)`, the child is launched with an argv
//! vector and the exit status is collected with `waitpid`.

mod unix_process;

pub use unix_process::UnixProcess;

pub fn platform_name() -> &'static str {
    "Unix"
}
