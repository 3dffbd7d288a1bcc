use crate::config::CommandLine;
use crate::error::{ProcessError, Result};
use crate::stdio::{ChildStderr, ChildStdin, ChildStdout};
use std::fmt;
use tracing::{debug, warn};

/// Unique identifier for a process
pub type ProcessId = u32;

/// Lifecycle state of a [`Process`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    /// Spawned; all three streams are open
    Created,
    /// Waited on; stdin is closed and the exit code is known
    Joined,
    /// All streams and the native reference are released
    Destroyed,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::Created => "created",
            ProcessState::Joined => "joined",
            ProcessState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Everything a backend produces when it launches a child
pub struct Spawned<N> {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
    pub native: N,
}

impl<N> Spawned<N> {
    /// Wrap the native reference, keeping the streams as they are
    pub fn map<M>(self, f: impl FnOnce(N) -> M) -> Spawned<M> {
        Spawned {
            stdin: self.stdin,
            stdout: self.stdout,
            stderr: self.stderr,
            native: f(self.native),
        }
    }
}

/// Platform-specific reference to a running child
///
/// Implemented once per target OS. A backend owns every OS resource it
/// acquires from the moment it exists, so a failing `spawn` releases the
/// pipes and handles opened before the failure.
pub trait NativeProcess: Sized {
    /// Launch `command_line` with its standard streams connected to fresh pipes
    fn spawn(command_line: &CommandLine) -> Result<Spawned<Self>>;

    /// OS process id of the child
    fn id(&self) -> ProcessId;

    /// Block until the child terminates and return its exit code
    ///
    /// Called at most once per child.
    fn wait(&mut self) -> Result<i32>;

    /// Release the native reference without killing the child
    fn release(self) -> Result<()>;
}

/// A spawned child process together with its three standard streams
pub struct Process<N: NativeProcess> {
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    native: Option<N>,
    pid: ProcessId,
    command_line: String,
    state: ProcessState,
    exit_code: Option<i32>,
}

impl<N: NativeProcess> Process<N> {
    /// Spawn a child from a sequence whose first element is the executable
    pub fn create<S: AsRef<str>>(command_line: &[S]) -> Result<Self> {
        let command_line = CommandLine::from_parts(command_line)?;
        Self::spawn(&command_line)
    }

    /// Spawn a child from an already validated [`CommandLine`]
    pub fn spawn(command_line: &CommandLine) -> Result<Self> {
        let Spawned {
            stdin,
            stdout,
            stderr,
            native,
        } = N::spawn(command_line)?;

        let pid = native.id();
        debug!(pid, command_line = %command_line, "Process created");

        Ok(Self {
            stdin: Some(stdin),
            stdout: Some(stdout),
            stderr: Some(stderr),
            native: Some(native),
            pid,
            command_line: command_line.joined(),
            state: ProcessState::Created,
            exit_code: None,
        })
    }

    /// Write end of the child's standard input
    ///
    /// Unavailable once the process has been joined or destroyed.
    pub fn stdin(&self) -> Result<&ChildStdin> {
        self.stdin.as_ref().ok_or_else(|| self.invalid_state("write stdin of"))
    }

    /// Read end of the child's standard output
    pub fn stdout(&self) -> Result<&ChildStdout> {
        self.stdout.as_ref().ok_or_else(|| self.invalid_state("read stdout of"))
    }

    /// Read end of the child's standard error
    pub fn stderr(&self) -> Result<&ChildStderr> {
        self.stderr.as_ref().ok_or_else(|| self.invalid_state("read stderr of"))
    }

    /// Close stdin and block until the child exits
    ///
    /// Returns the child's exit code. A non-zero exit code is not an error.
    pub fn join(&mut self) -> Result<i32> {
        if self.state != ProcessState::Created {
            return Err(self.invalid_state("join"));
        }

        // Dropping the write end is the child's end-of-input.
        drop(self.stdin.take());

        let Some(native) = self.native.as_mut() else {
            return Err(self.invalid_state("join"));
        };
        let code = native.wait()?;

        debug!(pid = self.pid, code, "Process joined");
        self.exit_code = Some(code);
        self.state = ProcessState::Joined;
        Ok(code)
    }

    /// Release every remaining stream and the native reference
    ///
    /// A child that is still running is not killed and keeps running on its
    /// own.
    pub fn destroy(&mut self) -> Result<()> {
        if self.state == ProcessState::Destroyed {
            return Err(self.invalid_state("destroy"));
        }

        drop(self.stdin.take());
        drop(self.stdout.take());
        drop(self.stderr.take());
        self.state = ProcessState::Destroyed;

        if let Some(native) = self.native.take() {
            native.release()?;
        }

        debug!(pid = self.pid, "Process destroyed");
        Ok(())
    }

    pub fn id(&self) -> ProcessId {
        self.pid
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Exit code observed by [`join`](Self::join)
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// The space-joined command line the child was created from
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    fn invalid_state(&self, operation: &'static str) -> ProcessError {
        ProcessError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl<N: NativeProcess> fmt::Debug for Process<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("command_line", &self.command_line)
            .field("state", &self.state)
            .field("exit_code", &self.exit_code)
            .finish()
    }
}

impl<N: NativeProcess> Drop for Process<N> {
    fn drop(&mut self) {
        if self.state == ProcessState::Destroyed {
            return;
        }

        if let Err(e) = self.destroy() {
            warn!(pid = self.pid, "Failed to release process during drop: {}", e);
        }
    }
}
