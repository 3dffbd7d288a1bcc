use pipeproc_core::{CommandLine, NativeProcess, ProcessError, ProcessId, Result, Spawned};

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use pipeproc_core::{ChildStderr, ChildStdin, ChildStdout};
    use std::fs::File;
    use std::os::windows::io::{AsRawHandle, FromRawHandle, IntoRawHandle, OwnedHandle};
    use tracing::{debug, info, warn};
    use windows::Win32::Foundation::{
        CloseHandle, HANDLE, HANDLE_FLAG_INHERIT, HANDLE_FLAGS, SetHandleInformation, WAIT_FAILED,
    };
    use windows::Win32::Security::SECURITY_ATTRIBUTES;
    use windows::Win32::System::Pipes::CreatePipe;
    use windows::Win32::System::Threading::{
        CreateProcessW, GetExitCodeProcess, INFINITE, PROCESS_CREATION_FLAGS, PROCESS_INFORMATION,
        STARTF_USESTDHANDLES, STARTUPINFOW, WaitForSingleObject,
    };
    use windows::core::{PCWSTR, PWSTR};

    fn raw(handle: &OwnedHandle) -> HANDLE {
        HANDLE(handle.as_raw_handle())
    }

    /// Anonymous pipe whose two ends are both inheritable
    ///
    /// Returns `(read, write)`. Each end is owned as soon as it exists, so an
    /// early return closes it.
    fn inheritable_pipe(resource: &'static str) -> Result<(OwnedHandle, OwnedHandle)> {
        let attributes = SECURITY_ATTRIBUTES {
            nLength: std::mem::size_of::<SECURITY_ATTRIBUTES>() as u32,
            lpSecurityDescriptor: std::ptr::null_mut(),
            bInheritHandle: true.into(),
        };
        let mut read = HANDLE::default();
        let mut write = HANDLE::default();

        // SAFETY: both out-pointers are valid for the duration of the call
        unsafe {
            CreatePipe(
                &mut read,
                &mut write,
                Some(&attributes as *const SECURITY_ATTRIBUTES),
                0,
            )
        }
        .map_err(|e| ProcessError::allocation(resource, e.into()))?;

        // SAFETY: CreatePipe succeeded, so both handles are open and unowned
        Ok(unsafe {
            (
                OwnedHandle::from_raw_handle(read.0),
                OwnedHandle::from_raw_handle(write.0),
            )
        })
    }

    /// Keep the parent's end of a pipe out of every child it launches
    fn disable_inherit(handle: &OwnedHandle, resource: &'static str) -> Result<()> {
        // SAFETY: the handle is open for as long as the borrow lasts
        unsafe { SetHandleInformation(raw(handle), HANDLE_FLAG_INHERIT.0, HANDLE_FLAGS(0)) }
            .map_err(|e| ProcessError::allocation(resource, e.into()))
    }

    /// Windows-specific native process reference: the process handle itself
    #[derive(Debug)]
    pub struct WindowsProcess {
        handle: OwnedHandle,
        pid: ProcessId,
    }

    impl NativeProcess for WindowsProcess {
        fn spawn(command_line: &CommandLine) -> Result<Spawned<Self>> {
            let (stdin_read, stdin_write) = inheritable_pipe("stdin pipe")?;
            disable_inherit(&stdin_write, "stdin pipe")?;

            let (stdout_read, stdout_write) = inheritable_pipe("stdout pipe")?;
            disable_inherit(&stdout_read, "stdout pipe")?;

            let (stderr_read, stderr_write) = inheritable_pipe("stderr pipe")?;
            disable_inherit(&stderr_read, "stderr pipe")?;

            let startup = STARTUPINFOW {
                cb: std::mem::size_of::<STARTUPINFOW>() as u32,
                dwFlags: STARTF_USESTDHANDLES,
                hStdInput: raw(&stdin_read),
                hStdOutput: raw(&stdout_write),
                hStdError: raw(&stderr_write),
                ..Default::default()
            };
            let mut information = PROCESS_INFORMATION::default();

            // CreateProcessW may modify the buffer in place, so it must be
            // writable and NUL-terminated.
            let joined = command_line.joined();
            let mut wide: Vec<u16> = joined.encode_utf16().chain(std::iter::once(0)).collect();

            // SAFETY: every pointer refers to a live local for the duration of
            // the call; the standard handles stay open until after it returns.
            unsafe {
                CreateProcessW(
                    PCWSTR::null(),
                    Some(PWSTR(wide.as_mut_ptr())),
                    None,
                    None,
                    true.into(),
                    PROCESS_CREATION_FLAGS(0),
                    None,
                    PCWSTR::null(),
                    &startup,
                    &mut information,
                )
            }
            .map_err(|e| {
                warn!("Failed to spawn process '{}': {}", joined, e);
                ProcessError::launch(joined.clone(), e.into())
            })?;

            // SAFETY: CreateProcessW succeeded and handed us both handles
            let (handle, thread) = unsafe {
                (
                    OwnedHandle::from_raw_handle(information.hProcess.0),
                    OwnedHandle::from_raw_handle(information.hThread.0),
                )
            };
            // The primary thread handle is not needed once the process exists
            drop(thread);

            // The child has its own copies now
            drop(stdin_read);
            drop(stdout_write);
            drop(stderr_write);

            let pid = information.dwProcessId;
            info!(pid, "Spawned Windows process: {}", joined);

            Ok(Spawned {
                stdin: ChildStdin::new(File::from(stdin_write)),
                stdout: ChildStdout::new(File::from(stdout_read)),
                stderr: ChildStderr::new(File::from(stderr_read)),
                native: WindowsProcess { handle, pid },
            })
        }

        fn id(&self) -> ProcessId {
            self.pid
        }

        fn wait(&mut self) -> Result<i32> {
            // SAFETY: the process handle is owned by self and still open
            let event = unsafe { WaitForSingleObject(raw(&self.handle), INFINITE) };
            if event == WAIT_FAILED {
                let error = std::io::Error::last_os_error();
                warn!(pid = self.pid, "Failed to wait for process: {}", error);
                return Err(ProcessError::WaitFailed(error));
            }

            let mut code = 0u32;
            // SAFETY: as above; `code` is a valid out-pointer
            unsafe { GetExitCodeProcess(raw(&self.handle), &mut code) }
                .map_err(|e| ProcessError::WaitFailed(e.into()))?;

            debug!(pid = self.pid, code, "Windows process exited");
            Ok(code as i32)
        }

        fn release(self) -> Result<()> {
            let handle = HANDLE(self.handle.into_raw_handle());

            // SAFETY: ownership was just taken out of the OwnedHandle
            unsafe { CloseHandle(handle) }.map_err(|e| ProcessError::ReleaseFailed(e.into()))?;
            debug!(pid = self.pid, "Released Windows process handle");
            Ok(())
        }
    }

}

// Re-export the Windows implementation when on Windows systems
#[cfg(windows)]
pub use windows_impl::WindowsProcess;

// Provide a stub for non-Windows systems
#[cfg(not(windows))]
#[derive(Debug)]
pub struct WindowsProcess {
    _private: (),
}

#[cfg(not(windows))]
impl NativeProcess for WindowsProcess {
    fn spawn(command_line: &CommandLine) -> Result<Spawned<Self>> {
        Err(ProcessError::launch(
            command_line.joined(),
            std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "the Windows backend is not available on this platform",
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
