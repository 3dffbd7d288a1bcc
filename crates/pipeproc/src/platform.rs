use pipeproc_core::{CommandLine, NativeProcess, ProcessId, Result, Spawned};

/// Platform-specific native process implementations
#[derive(Debug)]
pub enum PlatformProcess {
    #[cfg(unix)]
    Unix(pipeproc_unix::UnixProcess),
    #[cfg(windows)]
    Windows(pipeproc_windows::WindowsProcess),
}

#[cfg(not(any(unix, windows)))]
compile_error!("Unsupported platform: only Unix and Windows are currently supported");

impl NativeProcess for PlatformProcess {
    fn spawn(command_line: &CommandLine) -> Result<Spawned<Self>> {
        #[cfg(unix)]
        return pipeproc_unix::UnixProcess::spawn(command_line).map(|s| s.map(Self::Unix));

        #[cfg(windows)]
        return pipeproc_windows::WindowsProcess::spawn(command_line)
            .map(|s| s.map(Self::Windows));
    }

    fn id(&self) -> ProcessId {
        match self {
            #[cfg(unix)]
            Self::Unix(process) => process.id(),
            #[cfg(windows)]
            Self::Windows(process) => process.id(),
        }
    }

    fn wait(&mut self) -> Result<i32> {
        match self {
            #[cfg(unix)]
            Self::Unix(process) => process.wait(),
            #[cfg(windows)]
            Self::Windows(process) => process.wait(),
        }
    }

    fn release(self) -> Result<()> {
        match self {
            #[cfg(unix)]
            Self::Unix(process) => process.release(),
            #[cfg(windows)]
            Self::Windows(process) => process.release(),
        }
    }
}

/// Name of the backend selected at compile time
pub fn platform_name() -> &'static str {
    #[cfg(unix)]
    {
        pipeproc_unix::platform_name()
    }

    #[cfg(windows)]
    {
        pipeproc_windows::platform_name()
    }
}
