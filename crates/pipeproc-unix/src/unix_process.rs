use pipeproc_core::{CommandLine, NativeProcess, ProcessError, ProcessId, Result, Spawned};

#[cfg(unix)]
mod unix_impl {
    use super::*;
    use nix::errno::Errno;
    use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
    use nix::unistd::Pid;
    use pipeproc_core::{ChildStderr, ChildStdin, ChildStdout};
    use std::fs::File;
    use std::os::fd::OwnedFd;
    use std::process::{Command, Stdio};
    use tracing::{debug, info, warn};

    /// Both ends of a pipe, neither inheritable across `exec`
    ///
    /// The ends handed to the child become inheritable again when they are
    /// duplicated onto its standard descriptors.
    #[cfg(not(target_vendor = "apple"))]
    fn cloexec_pipe(resource: &'static str) -> Result<(OwnedFd, OwnedFd)> {
        use nix::fcntl::OFlag;

        nix::unistd::pipe2(OFlag::O_CLOEXEC)
            .map_err(|e| ProcessError::allocation(resource, e.into()))
    }

    #[cfg(target_vendor = "apple")]
    fn cloexec_pipe(resource: &'static str) -> Result<(OwnedFd, OwnedFd)> {
        use nix::fcntl::{FcntlArg, FdFlag, fcntl};

        let (read, write) =
            nix::unistd::pipe().map_err(|e| ProcessError::allocation(resource, e.into()))?;
        for end in [&read, &write] {
            fcntl(end, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))
                .map_err(|e| ProcessError::allocation(resource, e.into()))?;
        }
        Ok((read, write))
    }

    /// Unix-specific native process reference
    ///
    /// The pid is all that is needed to wait on the child. `reaped` records
    /// that the exit status has been collected, after which the pid may be
    /// reused by the OS and must not be waited on again.
    #[derive(Debug)]
    pub struct UnixProcess {
        pid: Pid,
        reaped: bool,
    }

    /// Exit code for a wait status, `None` if the child has not terminated
    fn status_code(status: WaitStatus) -> Option<i32> {
        match status {
            WaitStatus::Exited(_, code) => Some(code),
            // Shell convention for a child killed by a signal
            WaitStatus::Signaled(_, signal, _) => Some(128 + signal as i32),
            _ => None,
        }
    }

    impl NativeProcess for UnixProcess {
        fn spawn(command_line: &CommandLine) -> Result<Spawned<Self>> {
            let (stdin_read, stdin_write) = cloexec_pipe("stdin pipe")?;
            let (stdout_read, stdout_write) = cloexec_pipe("stdout pipe")?;
            let (stderr_read, stderr_write) = cloexec_pipe("stderr pipe")?;

            let mut command = Command::new(command_line.program());
            command
                .args(command_line.args())
                .stdin(Stdio::from(stdin_read))
                .stdout(Stdio::from(stdout_write))
                .stderr(Stdio::from(stderr_write));

            let child = command.spawn().map_err(|e| {
                warn!("Failed to spawn process '{}': {}", command_line, e);
                ProcessError::launch(command_line.joined(), e)
            })?;

            // The command still owns the child-side ends; the parent must not
            // hold them or reads on stdout/stderr never see end-of-file.
            drop(command);

            let pid = Pid::from_raw(child.id() as i32);
            info!(
                "Spawned Unix process: {} (PID: {}) with args: {:?}",
                command_line.program(),
                pid,
                command_line.args()
            );

            Ok(Spawned {
                stdin: ChildStdin::new(File::from(stdin_write)),
                stdout: ChildStdout::new(File::from(stdout_read)),
                stderr: ChildStderr::new(File::from(stderr_read)),
                native: UnixProcess { pid, reaped: false },
            })
        }

        fn id(&self) -> ProcessId {
            self.pid.as_raw() as ProcessId
        }

        fn wait(&mut self) -> Result<i32> {
            loop {
                match waitpid(self.pid, None) {
                    Ok(status) => {
                        if let Some(code) = status_code(status) {
                            self.reaped = true;
                            debug!("Unix process {} exited with code {}", self.pid, code);
                            return Ok(code);
                        }
                    }
                    Err(Errno::EINTR) => {}
                    Err(e) => {
                        warn!("Failed to wait for process {}: {}", self.pid, e);
                        return Err(ProcessError::WaitFailed(e.into()));
                    }
                }
            }
        }

        fn release(self) -> Result<()> {
            if self.reaped {
                return Ok(());
            }

            // Collect the exit status of a child that already finished so it
            // does not linger as a zombie; a running child is left alone.
            match waitpid(self.pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => {
                    debug!("Unix process {} still running, detaching", self.pid);
                    Ok(())
                }
                Ok(status) => {
                    debug!("Reaped Unix process {}: {:?}", self.pid, status);
                    Ok(())
                }
                Err(Errno::ECHILD) => {
                    debug!("Unix process {} already reaped", self.pid);
                    Ok(())
                }
                Err(e) => Err(ProcessError::ReleaseFailed(e.into())),
            }
        }
    }

}

// Re-export the Unix implementation when on Unix systems
#[cfg(unix)]
pub use unix_impl::UnixProcess;

// Provide a stub for non-Unix systems
#[cfg(not(unix))]
#[derive(Debug)]
pub struct UnixProcess {
    _private: (),
}

#[cfg(not(unix))]
impl NativeProcess for UnixProcess {
    fn spawn(command_line: &CommandLine) -> Result<Spawned<Self>> {
        Err(ProcessError::launch(
            command_line.joined(),
            std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "the Unix backend is not available on this platform",
            ),
        ))
    }

    fn id(&self) -> ProcessId {
        0
    }

    fn wait(&mut self) -> Result<i32> {
        Err(ProcessError::WaitFailed(std::io::ErrorKind::Unsupported.into()))
    }

    fn release(self) -> Result<()> {
        Ok(())
    }
}
