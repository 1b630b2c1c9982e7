// SPDX-License-Identifier: MIT
//
// Error taxonomy for the terminal engine.
//
// Only unrecoverable conditions live here. A read that comes back empty
// because the timeout expired is not an error (the decoder retries), and a
// failed append-buffer grow is absorbed by the buffer itself.

use std::io;

use thiserror::Error;

/// A fatal terminal failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Standard input is a pipe or file, so there is no terminal to drive.
    #[error("stdin is not a terminal")]
    NotATerminal,

    /// `tcgetattr` failed: the terminal settings could not be read.
    #[error("tcgetattr: {0}")]
    GetAttr(#[source] io::Error),

    /// `tcsetattr` failed: the terminal settings could not be applied.
    #[error("tcsetattr: {0}")]
    SetAttr(#[source] io::Error),

    /// `ioctl(TIOCGWINSZ)` failed or reported an empty window.
    #[error("window size: {0}")]
    WindowSize(#[source] io::Error),

    /// Reading stdin failed with something other than "no data yet".
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Writing a frame to the terminal failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_call() {
        let e = Error::GetAttr(io::Error::from_raw_os_error(libc::ENOTTY));
        assert!(e.to_string().starts_with("tcgetattr: "));

        let e = Error::SetAttr(io::Error::other("nope"));
        assert_eq!(e.to_string(), "tcsetattr: nope");

        let e = Error::WindowSize(io::Error::other("zero columns"));
        assert_eq!(e.to_string(), "window size: zero columns");
    }

    #[test]
    fn not_a_terminal_has_no_source() {
        use std::error::Error as _;

        let e = Error::NotATerminal;
        assert_eq!(e.to_string(), "stdin is not a terminal");
        assert!(e.source().is_none());
    }

    #[test]
    fn source_is_the_io_error() {
        use std::error::Error as _;

        let e = Error::Read(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let source = e.source().unwrap();
        assert_eq!(source.to_string(), "gone");
    }
}
