// SPDX-License-Identifier: MIT
//
// kiln-term — Terminal engine for kiln.
//
// The three pieces a full-screen editor needs before it can edit anything:
// a raw-mode guard that hands the terminal back exactly as it found it, a
// decoder that turns raw stdin bytes into logical keys, and an append
// buffer that stages a whole frame so it reaches the terminal in one write.
//
// Everything talks to the terminal directly through termios and ANSI
// escape sequences. There is no TUI framework in between.

#[cfg(not(unix))]
compile_error!("kiln-term drives the terminal through termios and requires a Unix target");

pub mod ansi;
pub mod error;
pub mod input;
pub mod output;
pub mod terminal;

pub use error::{Error, Result};
