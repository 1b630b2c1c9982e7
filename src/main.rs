// SPDX-License-Identifier: MIT
//
// kiln — a minimal full-screen terminal text editor.
//
// This is the main binary that wires together the crates:
//
//   kiln-term   → raw mode, key decoding, append-buffer output
//   kiln-editor → view state, frame renderer, editor loop
//
// Process lifecycle:
//
//   config → log file → raw mode on → window size → editor loop
//          → raw mode off → exit 0
//
// A fatal error restores the terminal, clears the screen, prints
// `kiln: <error>` to stderr and exits 1. The `RawMode` guard lives inside
// `edit` / `keys`, so it has always dropped (and restored the terminal)
// by the time `process::exit` runs, since `exit` itself skips destructors.

mod config;
mod logging;

use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::process;

use kiln_editor::editor::{self, Editor};
use kiln_term::input::{Key, KeyDecoder};
use kiln_term::terminal::{self, RawFlags, RawMode, TtyReader, TtyWriter};
use kiln_term::{Error, Result};
use tracing::{error, info};

use crate::config::{Config, ConfigError, Mode, USAGE};

/// Exit status for bad arguments or environment.
const EXIT_USAGE: i32 = 2;

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let config = match Config::from_process() {
        Ok(config) => config,
        Err(e) => return usage_error(&e, &mut io::stderr()),
    };

    match config.mode {
        Mode::Help => {
            println!("{USAGE}");
            return 0;
        }
        Mode::Version => {
            println!("kiln {}", env!("CARGO_PKG_VERSION"));
            return 0;
        }
        Mode::Edit | Mode::Keys => {}
    }

    if let Err(e) = logging::init(&config) {
        eprintln!("kiln: cannot open log file: {e}");
        return 1;
    }

    let result = if config.mode == Mode::Keys {
        keys(&config)
    } else {
        edit(&config)
    };

    finish(result, &mut TtyWriter::stdout(), &mut io::stderr())
}

/// Report a bad argument or environment value and return the usage status.
fn usage_error(e: &ConfigError, err: &mut impl Write) -> i32 {
    let _ = writeln!(err, "kiln: {e}\n\n{USAGE}");
    EXIT_USAGE
}

/// Turn the session result into an exit status.
///
/// On failure the terminal is already back in canonical mode: the screen
/// is cleared on `out` first, then `kiln: <error>` goes to `err`.
fn finish(result: Result<()>, out: &mut impl Write, err: &mut impl Write) -> i32 {
    match result {
        Ok(()) => {
            info!("clean exit");
            0
        }
        Err(e) => {
            error!(error = %e, "fatal");
            let _ = editor::clear_screen(out);
            let _ = writeln!(err, "kiln: {e}");
            1
        }
    }
}

/// Raw mode on `fd` with the configured read timeout.
fn raw_mode(fd: RawFd, config: &Config) -> Result<RawMode> {
    if !terminal::is_tty(fd) {
        return Err(Error::NotATerminal);
    }
    RawMode::enable(fd, RawFlags::all(), config.read_timeout)
}

/// The full-screen editor.
fn edit(config: &Config) -> Result<()> {
    let _raw = raw_mode(io::stdin().as_raw_fd(), config)?;
    let size = terminal::window_size(io::stdout().as_raw_fd())?;

    let mut editor = Editor::new(size);
    editor.run(&mut KeyDecoder::new(TtyReader::stdin()), &mut TtyWriter::stdout())
}

/// The key inspector (`--keys`).
fn keys(config: &Config) -> Result<()> {
    let _raw = raw_mode(io::stdin().as_raw_fd(), config)?;
    inspect(&mut KeyDecoder::new(TtyReader::stdin()), &mut TtyWriter::stdout())
}

/// Print one line per decoded key until Ctrl-Q. Output post-processing is
/// off in raw mode, so every line ends with an explicit `\r\n`.
fn inspect<R: Read, W: Write>(keys: &mut KeyDecoder<R>, out: &mut W) -> Result<()> {
    out.write_all(b"Press keys to see how they decode. Ctrl-Q quits.\r\n")
        .map_err(Error::Write)?;

    loop {
        let key = keys.read_key()?;
        out.write_all(format!("{key}\r\n").as_bytes())
            .map_err(Error::Write)?;
        if key == Key::Quit {
            return Ok(());
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inspect_bytes(input: &[u8]) -> String {
        let mut out = Vec::new();
        inspect(&mut KeyDecoder::new(input), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn inspector_lists_keys_until_quit() {
        assert_eq!(
            inspect_bytes(b"a\x1b[A\x01\x11"),
            "Press keys to see how they decode. Ctrl-Q quits.\r\n\
             97 ('a')\r\n\
             up\r\n\
             1 (Ctrl-A)\r\n\
             17 (Ctrl-Q)\r\n"
        );
    }

    #[test]
    fn inspector_stops_at_quit() {
        let mut keys = KeyDecoder::new(&b"\x11zz"[..]);
        let mut out = Vec::new();
        inspect(&mut keys, &mut out).unwrap();
        assert_eq!(keys.into_inner(), b"zz");
    }

    #[test]
    fn inspector_reports_write_failure() {
        let err = inspect(&mut KeyDecoder::new(&b"\x11"[..]), &mut Closed).unwrap_err();
        assert!(matches!(err, Error::Write(_)));
    }

    // -- Exit status --------------------------------------------------------

    /// Writer that refuses every byte.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn finish_with(result: Result<()>) -> (i32, Vec<u8>, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let status = finish(result, &mut out, &mut err);
        (status, out, String::from_utf8(err).unwrap())
    }

    #[test]
    fn clean_exit_is_zero_and_silent() {
        let (status, out, err) = finish_with(Ok(()));
        assert_eq!(status, 0);
        assert!(out.is_empty());
        assert_eq!(err, "");
    }

    #[test]
    fn fatal_error_clears_then_reports() {
        let e = Error::GetAttr(io::Error::other("Inappropriate ioctl for device"));
        let (status, out, err) = finish_with(Err(e));
        assert_eq!(status, 1);
        assert_eq!(out, b"\x1b[H\x1b[2J");
        assert_eq!(err, "kiln: tcgetattr: Inappropriate ioctl for device\n");
    }

    #[test]
    fn fatal_error_is_reported_when_clear_fails() {
        let mut err = Vec::new();
        let status = finish(Err(Error::NotATerminal), &mut Closed, &mut err);
        assert_eq!(status, 1);
        assert_eq!(err, b"kiln: stdin is not a terminal\n");
    }

    #[test]
    fn usage_error_is_two_and_shows_usage() {
        let mut err = Vec::new();
        let e = ConfigError::UnknownArgument("--bogus".into());
        assert_eq!(usage_error(&e, &mut err), 2);

        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("kiln: unrecognized argument '--bogus'\n\n"));
        assert!(err.ends_with(&format!("{USAGE}\n")));
    }

    #[test]
    fn raw_mode_refuses_non_terminal() {
        let null = std::fs::File::open("/dev/null").unwrap();
        let result = raw_mode(null.as_raw_fd(), &Config::default());
        assert!(matches!(result, Err(Error::NotATerminal)));
    }
}
