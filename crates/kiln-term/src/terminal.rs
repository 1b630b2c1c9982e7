// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and RAII restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd reads/writes. These
// are the standard POSIX interfaces for terminal control; there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// The terminal's original settings are captured exactly once, owned by a
// `RawMode` guard, and written back when the guard goes away. There is no
// global copy and no exit hook: the guard is dropped on every path out of
// the scope that created it (normal return, `?`, unwinding panic). Callers
// that end the process with `process::exit` must let the guard drop first,
// because `exit` does not run destructors.
//
// Reads and writes go straight to the file descriptor. Rust's `Stdout` is
// line-buffered and would split a frame at its last newline, which is
// exactly the tearing the append buffer exists to prevent.

use std::fmt;
use std::io::{self, Read, Write};
use std::os::unix::io::RawFd;

use bitflags::bitflags;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the window size of the terminal behind `fd` via `ioctl(TIOCGWINSZ)`.
///
/// A window reporting zero rows or zero columns counts as a failed query:
/// nothing can be drawn into it.
///
/// # Errors
///
/// Returns [`Error::WindowSize`] if the ioctl fails (e.g. `fd` is not a
/// terminal) or the reported size is empty.
pub fn window_size(fd: RawFd) -> Result<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &raw mut ws) };

    if result != 0 {
        return Err(Error::WindowSize(io::Error::last_os_error()));
    }
    if ws.ws_col == 0 || ws.ws_row == 0 {
        return Err(Error::WindowSize(io::Error::other(format!(
            "terminal reported {}x{}",
            ws.ws_col, ws.ws_row
        ))));
    }

    let size = Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    };
    debug!(cols = size.cols, rows = size.rows, "window size");
    Ok(size)
}

/// Check whether `fd` refers to a terminal.
#[must_use]
pub fn is_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

// ─── Raw Mode Description ───────────────────────────────────────────────────

bitflags! {
    /// Terminal behaviors that raw mode switches off.
    ///
    /// [`RawFlags::all`] is the full raw mode an editor wants. Each flag
    /// maps onto one or more termios bits in [`Settings::make_raw`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RawFlags: u16 {
        /// Echo of typed characters (`ECHO`).
        const ECHO              = 1 << 0;
        /// Line buffering; bytes arrive one at a time instead (`ICANON`).
        const CANONICAL         = 1 << 1;
        /// Ctrl-C / Ctrl-Z / Ctrl-\ generating signals (`ISIG`).
        const SIGNALS           = 1 << 2;
        /// Ctrl-V literal-next and friends (`IEXTEN`).
        const EXTENDED_INPUT    = 1 << 3;
        /// Ctrl-S / Ctrl-Q software flow control (`IXON`).
        const FLOW_CONTROL      = 1 << 4;
        /// Carriage return translated to newline on input (`ICRNL`).
        const CR_TO_NL          = 1 << 5;
        /// Break condition raising SIGINT (`BRKINT`).
        const BREAK_INTERRUPT   = 1 << 6;
        /// Input parity checking (`INPCK`).
        const PARITY_CHECK      = 1 << 7;
        /// Stripping the 8th bit of every input byte (`ISTRIP`).
        const STRIP_HIGH_BIT    = 1 << 8;
        /// Output post-processing such as `\n` → `\r\n` (`OPOST`).
        const OUTPUT_PROCESSING = 1 << 9;
    }
}

impl Default for RawFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// How long a raw-mode `read()` waits before returning with no data.
///
/// termios measures this in tenths of a second (`VTIME`), from 0.1s to
/// 25.5s. `VMIN` is always 0, so a read returns as soon as one byte is
/// available or the timeout expires, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTimeout {
    deciseconds: u8,
}

impl ReadTimeout {
    /// Timeout from milliseconds, rounded to the nearest tenth of a second
    /// and clamped into `100ms..=25.5s`.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        let tenths = ms.saturating_add(50) / 100;
        let deciseconds = u8::try_from(tenths.clamp(1, 255)).unwrap_or(u8::MAX);
        Self { deciseconds }
    }

    /// The timeout in tenths of a second, as written to `VTIME`.
    #[inline]
    #[must_use]
    pub const fn deciseconds(self) -> u8 {
        self.deciseconds
    }

    /// The timeout in milliseconds.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.deciseconds as u64 * 100
    }
}

impl Default for ReadTimeout {
    fn default() -> Self {
        Self { deciseconds: 1 }
    }
}

// ─── Settings ───────────────────────────────────────────────────────────────

/// A snapshot of a terminal's termios configuration.
#[derive(Clone, Copy)]
pub struct Settings {
    termios: libc::termios,
}

impl Settings {
    /// Read the current settings of the terminal behind `fd`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GetAttr`] if `tcgetattr` fails.
    pub fn capture(fd: RawFd) -> Result<Self> {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(Error::GetAttr(io::Error::last_os_error()));
        }
        Ok(Self { termios })
    }

    /// Apply these settings to the terminal behind `fd`.
    ///
    /// Uses `TCSAFLUSH`: pending output drains and unread input is
    /// discarded before the change takes effect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SetAttr`] if `tcsetattr` fails.
    pub fn apply(&self, fd: RawFd) -> Result<()> {
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const self.termios) } != 0 {
            return Err(Error::SetAttr(io::Error::last_os_error()));
        }
        Ok(())
    }

    #[cfg(test)]
    const fn from_termios(termios: libc::termios) -> Self {
        Self { termios }
    }

    #[cfg(test)]
    const fn as_termios(&self) -> &libc::termios {
        &self.termios
    }

    /// Derive raw-mode settings from this snapshot.
    ///
    /// Clears the termios bits behind every flag in `flags`, forces 8-bit
    /// characters (`CS8`) and installs the non-blocking read policy:
    /// `VMIN = 0`, `VTIME = timeout`.
    #[must_use]
    pub fn make_raw(&self, flags: RawFlags, timeout: ReadTimeout) -> Self {
        let mut t = self.termios;

        let mut lflag: libc::tcflag_t = 0;
        if flags.contains(RawFlags::ECHO) {
            lflag |= libc::ECHO;
        }
        if flags.contains(RawFlags::CANONICAL) {
            lflag |= libc::ICANON;
        }
        if flags.contains(RawFlags::SIGNALS) {
            lflag |= libc::ISIG;
        }
        if flags.contains(RawFlags::EXTENDED_INPUT) {
            lflag |= libc::IEXTEN;
        }

        let mut iflag: libc::tcflag_t = 0;
        if flags.contains(RawFlags::FLOW_CONTROL) {
            iflag |= libc::IXON;
        }
        if flags.contains(RawFlags::CR_TO_NL) {
            iflag |= libc::ICRNL;
        }
        if flags.contains(RawFlags::BREAK_INTERRUPT) {
            iflag |= libc::BRKINT;
        }
        if flags.contains(RawFlags::PARITY_CHECK) {
            iflag |= libc::INPCK;
        }
        if flags.contains(RawFlags::STRIP_HIGH_BIT) {
            iflag |= libc::ISTRIP;
        }

        t.c_lflag &= !lflag;
        t.c_iflag &= !iflag;
        if flags.contains(RawFlags::OUTPUT_PROCESSING) {
            t.c_oflag &= !libc::OPOST;
        }
        t.c_cflag |= libc::CS8;

        t.c_cc[libc::VMIN] = 0;
        t.c_cc[libc::VTIME] = timeout.deciseconds();

        Self { termios: t }
    }
}

/// Settings compare by mode flags and control characters. Line discipline
/// and baud rate fields are not part of the editing configuration.
impl PartialEq for Settings {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.termios, &other.termios);
        a.c_iflag == b.c_iflag
            && a.c_oflag == b.c_oflag
            && a.c_cflag == b.c_cflag
            && a.c_lflag == b.c_lflag
            && a.c_cc == b.c_cc
    }
}

impl Eq for Settings {}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.termios;
        f.debug_struct("Settings")
            .field("iflag", &format_args!("{:#o}", t.c_iflag))
            .field("oflag", &format_args!("{:#o}", t.c_oflag))
            .field("cflag", &format_args!("{:#o}", t.c_cflag))
            .field("lflag", &format_args!("{:#o}", t.c_lflag))
            .field("vmin", &t.c_cc[libc::VMIN])
            .field("vtime", &t.c_cc[libc::VTIME])
            .finish()
    }
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw-mode guard with RAII restore.
///
/// Created by [`enable`](Self::enable), which captures the terminal's
/// settings before changing anything. The captured settings are written
/// back by [`restore`](Self::restore) or, failing that, on drop.
///
/// # Example
///
/// ```no_run
/// use kiln_term::terminal::RawMode;
///
/// let raw = RawMode::stdin()?;
/// // ... read keys, draw frames ...
/// drop(raw); // Terminal is back in canonical mode.
/// # Ok::<(), kiln_term::Error>(())
/// ```
pub struct RawMode {
    fd: RawFd,
    /// Settings to restore. `None` once restored.
    original: Option<Settings>,
}

impl RawMode {
    /// Put the terminal behind `fd` into raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GetAttr`] if the current settings cannot be read,
    /// in which case nothing was changed, or [`Error::SetAttr`] if the raw
    /// settings cannot be applied, in which case the original settings are
    /// re-applied before returning.
    pub fn enable(fd: RawFd, flags: RawFlags, timeout: ReadTimeout) -> Result<Self> {
        let original = Settings::capture(fd)?;

        // Guard exists before the first change, so a failed apply below
        // still restores on the way out.
        let guard = Self {
            fd,
            original: Some(original),
        };

        original.make_raw(flags, timeout).apply(fd)?;
        info!(fd, ?flags, timeout_ms = timeout.as_millis(), "raw mode enabled");

        Ok(guard)
    }

    /// Raw mode on stdin with every flag and the default 100ms timeout.
    ///
    /// # Errors
    ///
    /// See [`enable`](Self::enable).
    pub fn stdin() -> Result<Self> {
        Self::enable(libc::STDIN_FILENO, RawFlags::all(), ReadTimeout::default())
    }

    /// Write the captured settings back. Idempotent: once restored, further
    /// calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SetAttr`] if `tcsetattr` fails. The guard stays
    /// active so a later call (or drop) can try again.
    pub fn restore(&mut self) -> Result<()> {
        if let Some(original) = self.original {
            original.apply(self.fd)?;
            self.original = None;
            info!(fd = self.fd, "raw mode restored");
        }
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(fd = self.fd, error = %e, "failed to restore terminal settings");
        }
    }
}

// ─── Raw fd I/O ─────────────────────────────────────────────────────────────

/// Unbuffered reader over a terminal file descriptor.
///
/// One `read()` syscall per call. Under raw mode a read that times out
/// returns `Ok(0)`; that is "no data yet", not end of file.
#[derive(Debug, Clone, Copy)]
pub struct TtyReader {
    fd: RawFd,
}

impl TtyReader {
    #[must_use]
    pub const fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    #[must_use]
    pub const fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }
}

impl Read for TtyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        // n < 0 means errno is set; otherwise it is a byte count.
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }
}

/// Unbuffered writer over a terminal file descriptor.
///
/// Every `write_all` of a frame goes straight to the fd with no
/// intermediate line buffering.
#[derive(Debug, Clone, Copy)]
pub struct TtyWriter {
    fd: RawFd,
}

impl TtyWriter {
    #[must_use]
    pub const fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    #[must_use]
    pub const fn stdout() -> Self {
        Self::new(libc::STDOUT_FILENO)
    }
}

impl Write for TtyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(self.fd, buf.as_ptr().cast(), buf.len()) };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
