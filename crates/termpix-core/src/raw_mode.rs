#![forbid(unsafe_code)]

//! Scoped raw (non-canonical, no-echo) terminal mode.
//!
//! [`RawModeGuard`] captures a device's mode, switches it to raw, and restores
//! the captured mode when [`finish`](RawModeGuard::finish)ed or dropped. Only
//! `finish` reports a failed restore; the `Drop` path logs it.
//!
//! The device itself is abstracted behind [`ProbeDevice`] so probing logic can
//! run against a scripted stand-in in tests. [`TtyDevice`] is the Unix
//! implementation over stdin/stdout.

use std::fmt;
use std::io;
use std::time::Duration;

/// A terminal-like device that can be switched to raw mode and queried.
pub trait ProbeDevice {
    /// Saved terminal mode.
    type Mode;

    /// Read the current mode.
    fn capture_mode(&mut self) -> io::Result<Self::Mode>;

    /// Apply raw mode derived from `saved`.
    fn apply_raw(&mut self, saved: &Self::Mode) -> io::Result<()>;

    /// Reapply a saved mode.
    fn restore_mode(&mut self, saved: &Self::Mode) -> io::Result<()>;

    /// Write a query and flush it.
    fn write_query(&mut self, query: &[u8]) -> io::Result<()>;

    /// Wait up to `timeout` for one byte. `Ok(None)` means nothing arrived.
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

/// The saved terminal mode could not be reapplied.
///
/// The terminal may be left without echo or line buffering; callers should
/// surface this to the user.
#[derive(Debug)]
pub struct RestoreError {
    source: io::Error,
}

impl RestoreError {
    #[must_use]
    pub fn new(source: io::Error) -> Self {
        Self { source }
    }

    /// The underlying I/O failure.
    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to restore terminal mode: {}", self.source)
    }
}

impl std::error::Error for RestoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Failure entering raw mode.
#[derive(Debug)]
pub enum RawModeError {
    /// The mode could not be read or changed. The terminal is unchanged.
    Unavailable(io::Error),
    /// Raw mode failed part-way and the saved mode could not be reapplied.
    Restore(RestoreError),
}

impl fmt::Display for RawModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "raw mode unavailable: {e}"),
            Self::Restore(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RawModeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unavailable(e) => Some(e),
            Self::Restore(e) => Some(e),
        }
    }
}

/// Raw mode held for the guard's lifetime.
pub struct RawModeGuard<'d, D: ProbeDevice> {
    device: &'d mut D,
    saved: Option<D::Mode>,
}

impl<'d, D: ProbeDevice> RawModeGuard<'d, D> {
    /// Capture the current mode and switch `device` to raw mode.
    ///
    /// # Errors
    ///
    /// [`RawModeError::Unavailable`] if the mode cannot be read or set;
    /// [`RawModeError::Restore`] if setting failed and the original mode
    /// could not be put back.
    pub fn enter(device: &'d mut D) -> Result<Self, RawModeError> {
        let saved = device.capture_mode().map_err(RawModeError::Unavailable)?;
        if let Err(err) = device.apply_raw(&saved) {
            return match device.restore_mode(&saved) {
                Ok(()) => Err(RawModeError::Unavailable(err)),
                Err(restore) => Err(RawModeError::Restore(RestoreError::new(restore))),
            };
        }
        crate::trace!("entered raw mode");
        Ok(Self {
            device,
            saved: Some(saved),
        })
    }

    /// The device in raw mode.
    pub fn device(&mut self) -> &mut D {
        &mut *self.device
    }

    /// Restore the saved mode, reporting failure.
    ///
    /// # Errors
    ///
    /// [`RestoreError`] if the saved mode could not be reapplied.
    pub fn finish(mut self) -> Result<(), RestoreError> {
        match self.saved.take() {
            Some(saved) => self.device.restore_mode(&saved).map_err(RestoreError::new),
            None => Ok(()),
        }
    }
}

impl<D: ProbeDevice> Drop for RawModeGuard<'_, D> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            if let Err(_err) = self.device.restore_mode(&saved) {
                crate::error!(error = %_err, "failed to restore terminal mode");
            }
        }
    }
}

#[cfg(unix)]
pub use tty::TtyDevice;

#[cfg(unix)]
mod tty {
    use std::fs::File;
    use std::io::{self, IsTerminal, Read, Write};
    use std::os::fd::AsFd;
    use std::time::Duration;

    use nix::errno::Errno;
    use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
    use nix::sys::termios::{LocalFlags, SetArg, Termios, tcgetattr, tcsetattr};

    use super::ProbeDevice;

    /// The process's controlling terminal, via stdin and stdout.
    ///
    /// Input is read from a duplicate of the stdin descriptor so that bytes
    /// are never held in a userspace buffer `poll(2)` cannot see.
    pub struct TtyDevice {
        input: File,
        output: io::Stdout,
    }

    impl TtyDevice {
        /// Open the device, or `None` when stdin is not a terminal.
        #[must_use]
        pub fn open() -> Option<Self> {
            let stdin = io::stdin();
            if !stdin.is_terminal() {
                crate::debug!("stdin is not a terminal; skipping probe");
                return None;
            }
            let fd = match stdin.as_fd().try_clone_to_owned() {
                Ok(fd) => fd,
                Err(_err) => {
                    crate::debug!(error = %_err, "could not duplicate stdin");
                    return None;
                }
            };
            Some(Self {
                input: File::from(fd),
                output: io::stdout(),
            })
        }
    }

    impl ProbeDevice for TtyDevice {
        type Mode = Termios;

        fn capture_mode(&mut self) -> io::Result<Termios> {
            tcgetattr(&self.input).map_err(io::Error::other)
        }

        fn apply_raw(&mut self, saved: &Termios) -> io::Result<()> {
            let mut raw = saved.clone();
            raw.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
            tcsetattr(&self.input, SetArg::TCSANOW, &raw).map_err(io::Error::other)
        }

        fn restore_mode(&mut self, saved: &Termios) -> io::Result<()> {
            tcsetattr(&self.input, SetArg::TCSANOW, saved).map_err(io::Error::other)
        }

        fn write_query(&mut self, query: &[u8]) -> io::Result<()> {
            let mut out = self.output.lock();
            out.write_all(query)?;
            out.flush()
        }

        fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
            let timeout_ms: u16 = timeout.as_millis().try_into().unwrap_or(u16::MAX);
            let ready = loop {
                let mut fds = [PollFd::new(self.input.as_fd(), PollFlags::POLLIN)];
                match poll(&mut fds, PollTimeout::from(timeout_ms)) {
                    Ok(n) => break n,
                    Err(Errno::EINTR) => continue,
                    Err(e) => return Err(io::Error::other(e)),
                }
            };
            if ready == 0 {
                return Ok(None);
            }
            let mut byte = [0u8; 1];
            match self.input.read(&mut byte)? {
                0 => Ok(None),
                _ => Ok(Some(byte[0])),
            }
        }
    }
}
