// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns raw stdin bytes into logical keys. One call to
// [`KeyDecoder::read_key`] consumes at most three bytes:
//
// - `ESC [ A..D`      → arrow keys
// - `ESC x y` (other) → `UnknownEscape([x, y])`
// - `ESC` then silence → a bare `Escape` press
// - Ctrl-Q            → `Quit`
// - other bytes       → `Control` or `Printable`
//
// # Design
//
// Unlike a streaming parser, nothing is buffered between calls. Raw mode
// makes every read return after the configured timeout even with no data,
// so a lone ESC is resolved on the spot: if the bytes that would complete a
// sequence don't arrive within the timeout, the press was a bare Escape.
// Richer sequences (Home/End, function keys, modifiers) are not decoded and
// come back as `UnknownEscape` rather than being misread as something else.

use std::fmt;
use std::io::{self, Read};

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// The escape byte that starts every terminal control sequence.
pub const ESC: u8 = 0x1B;

/// The delete byte, which terminals send for Backspace.
pub const DEL: u8 = 0x7F;

/// The byte a terminal sends for Ctrl+`key`: the key with its top three
/// bits cleared.
#[inline]
#[must_use]
pub const fn ctrl(key: u8) -> u8 {
    key & 0x1F
}

/// Ctrl-Q, the quit key.
pub const QUIT: u8 = ctrl(b'q');

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A byte that is not a control character (includes bytes >= 0x80).
    Printable(u8),
    /// A control byte (`0x00..=0x1F` or `0x7F`) other than Ctrl-Q.
    Control(u8),
    /// `ESC [ A`
    MoveUp,
    /// `ESC [ B`
    MoveDown,
    /// `ESC [ D`
    MoveLeft,
    /// `ESC [ C`
    MoveRight,
    /// A bare Escape press, or an escape sequence cut short.
    Escape,
    /// A complete two-byte escape tail we don't decode.
    UnknownEscape([u8; 2]),
    /// Ctrl-Q.
    Quit,
}

impl Key {
    /// Classify a single byte that does not start an escape sequence.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            QUIT => Self::Quit,
            0x00..=0x1F | DEL => Self::Control(byte),
            _ => Self::Printable(byte),
        }
    }

    /// Decode the two bytes that followed an ESC.
    #[must_use]
    pub const fn from_escape_tail(tail: [u8; 2]) -> Self {
        match tail {
            [b'[', b'A'] => Self::MoveUp,
            [b'[', b'B'] => Self::MoveDown,
            [b'[', b'C'] => Self::MoveRight,
            [b'[', b'D'] => Self::MoveLeft,
            _ => Self::UnknownEscape(tail),
        }
    }
}

/// Human-readable form used by the key inspector: the byte value, plus the
/// character or key name where there is one.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Printable(b) if b.is_ascii() => write!(f, "{b} ('{}')", b as char),
            Self::Printable(b) => write!(f, "{b}"),
            Self::Control(DEL) => write!(f, "{DEL} (DEL)"),
            Self::Control(b) => write!(f, "{b} (Ctrl-{})", (b | 0x40) as char),
            Self::MoveUp => f.write_str("up"),
            Self::MoveDown => f.write_str("down"),
            Self::MoveLeft => f.write_str("left"),
            Self::MoveRight => f.write_str("right"),
            Self::Escape => write!(f, "{ESC} (Escape)"),
            Self::UnknownEscape([a, b]) => write!(f, "{ESC} {a} {b} (unknown sequence)"),
            Self::Quit => write!(f, "{QUIT} (Ctrl-Q)"),
        }
    }
}

// ─── KeyDecoder ─────────────────────────────────────────────────────────────

/// Reads bytes from `R` and decodes them one key at a time.
///
/// `R` is normally a [`TtyReader`](crate::terminal::TtyReader) over stdin
/// in raw mode. Any `Read` works; tests feed byte slices.
pub struct KeyDecoder<R> {
    reader: R,
}

impl<R: Read> KeyDecoder<R> {
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Block until a key is available and decode it.
    ///
    /// Empty reads (the raw-mode timeout firing), `WouldBlock` and
    /// `Interrupted` are retried. The first byte is waited for
    /// indefinitely; the two bytes that may follow an ESC get one read
    /// each, and a missing byte resolves the key as [`Key::Escape`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if reading the first byte fails for any
    /// other reason.
    pub fn read_key(&mut self) -> Result<Key> {
        let byte = loop {
            if let Some(b) = self.read_byte()? {
                break b;
            }
        };

        let key = if byte == ESC {
            self.read_escape_tail()
        } else {
            Key::from_byte(byte)
        };

        debug!(?key, "key");
        Ok(key)
    }

    /// Finish an escape sequence. Short reads and read errors both mean
    /// the user pressed Escape on its own.
    fn read_escape_tail(&mut self) -> Key {
        let Ok(Some(first)) = self.read_byte() else {
            return Key::Escape;
        };
        let Ok(Some(second)) = self.read_byte() else {
            return Key::Escape;
        };
        Key::from_escape_tail([first, second])
    }

    /// One read of at most one byte. `Ok(None)` means no data yet.
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.reader.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if is_transient(&e) => {
                trace!(error = %e, "no input yet");
                Ok(None)
            }
            Err(e) => Err(Error::Read(e)),
        }
    }

    /// Recover the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// "Nothing to read yet" as opposed to a real failure.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

// ─── Tests ──────────────────────────────────────────────────────────────────
