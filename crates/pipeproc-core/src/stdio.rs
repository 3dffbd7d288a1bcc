//! Unidirectional ends of the pipes connected to a child's standard streams
//!
//! Backends hand the parent-side pipe ends over as [`File`]s; the wrappers
//! here make sure the stdin end can only be written and the stdout/stderr
//! ends can only be read. Reads and writes also work through shared
//! references, so one thread can drain stdout while another feeds stdin.

use std::fs::File;
use std::io::{self, IoSlice, IoSliceMut, Read, Write};

/// Write end of the child's standard input
#[derive(Debug)]
pub struct ChildStdin(File);

impl ChildStdin {
    pub fn new(file: File) -> Self {
        ChildStdin(file)
    }
}

impl Write for ChildStdin {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        (&*self).write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

impl Write for &ChildStdin {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&self.0).write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        (&self.0).write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&self.0).flush()
    }
}

macro_rules! read_end {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name(File);

        impl $name {
            pub fn new(file: File) -> Self {
                $name(file)
            }
        }

        impl Read for $name {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                (&*self).read(buf)
            }

            fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
                (&*self).read_vectored(bufs)
            }
        }

        impl Read for &$name {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                (&self.0).read(buf)
            }

            fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
                (&self.0).read_vectored(bufs)
            }
        }

        #[cfg(unix)]
        impl std::os::fd::AsFd for $name {
            fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
                std::os::fd::AsFd::as_fd(&self.0)
            }
        }

        #[cfg(windows)]
        impl std::os::windows::io::AsHandle for $name {
            fn as_handle(&self) -> std::os::windows::io::BorrowedHandle<'_> {
                std::os::windows::io::AsHandle::as_handle(&self.0)
            }
        }
    };
}

read_end!(
    /// Read end of the child's standard output
    ChildStdout
);

read_end!(
    /// Read end of the child's standard error
    ChildStderr
);

#[cfg(unix)]
impl std::os::fd::AsFd for ChildStdin {
    fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
        std::os::fd::AsFd::as_fd(&self.0)
    }
}

#[cfg(windows)]
impl std::os::windows::io::AsHandle for ChildStdin {
    fn as_handle(&self) -> std::os::windows::io::BorrowedHandle<'_> {
        std::os::windows::io::AsHandle::as_handle(&self.0)
    }
}
