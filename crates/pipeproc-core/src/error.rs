use crate::process::ProcessState;
use thiserror::Error;

/// Convenience alias used across the pipeproc crates
pub type Result<T, E = ProcessError> = std::result::Result<T, E>;

/// Broad classification of a [`ProcessError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A pipe, handle or buffer could not be created
    ResourceAllocationFailed,
    /// The OS could not start the executable
    LaunchFailed,
    /// The command line was empty or had an empty program
    InvalidCommandLine,
    /// The OS wait or exit-status query failed
    WaitFailed,
    /// The native process reference could not be released
    ReleaseFailed,
    /// The operation is not valid in the handle's current state
    InvalidState,
}

/// Error types for process operations
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to allocate {resource}: {source}")]
    ResourceAllocationFailed {
        resource: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch `{command_line}`: {source}")]
    LaunchFailed {
        command_line: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid command line: {0}")]
    InvalidCommandLine(String),

    #[error("Failed to wait for process: {0}")]
    WaitFailed(#[source] std::io::Error),

    #[error("Failed to release process: {0}")]
    ReleaseFailed(#[source] std::io::Error),

    #[error("Cannot {operation} a process in state {state}")]
    InvalidState {
        operation: &'static str,
        state: ProcessState,
    },
}

impl ProcessError {
    pub fn allocation(resource: &'static str, source: std::io::Error) -> Self {
        ProcessError::ResourceAllocationFailed { resource, source }
    }

    pub fn launch(command_line: impl Into<String>, source: std::io::Error) -> Self {
        ProcessError::LaunchFailed {
            command_line: command_line.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::ResourceAllocationFailed { .. } => ErrorKind::ResourceAllocationFailed,
            ProcessError::LaunchFailed { .. } => ErrorKind::LaunchFailed,
            ProcessError::InvalidCommandLine(_) => ErrorKind::InvalidCommandLine,
            ProcessError::WaitFailed(_) => ErrorKind::WaitFailed,
            ProcessError::ReleaseFailed(_) => ErrorKind::ReleaseFailed,
            ProcessError::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }

    /// Check if this error was caused by misuse rather than by the OS
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ProcessError::InvalidState { .. } | ProcessError::InvalidCommandLine(_)
        )
    }

    /// The underlying OS error, if there is one
    pub fn os_error(&self) -> Option<&std::io::Error> {
        match self {
            ProcessError::ResourceAllocationFailed { source, .. }
            | ProcessError::LaunchFailed { source, .. }
            | ProcessError::WaitFailed(source)
            | ProcessError::ReleaseFailed(source) => Some(source),
            ProcessError::InvalidCommandLine(_) | ProcessError::InvalidState { .. } => None,
        }
    }
}
