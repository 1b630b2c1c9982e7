// SPDX-License-Identifier: MIT
//
// Append buffer — stage a whole frame, then write it once.
//
// Drawing a screen takes dozens of small pieces: escape sequences, tildes,
// padding, line breaks. Written one at a time, the terminal can show a
// half-drawn frame between them. Collected here first, the frame reaches
// the terminal in a single `write_all`.
//
// Growth is exact: each append reserves precisely the bytes it needs. If
// that reservation fails the append is dropped and the existing content is
// left as it was, so a render under memory pressure degrades to a partial
// frame instead of aborting.

use std::io::{self, Write};

use tracing::warn;

/// A growable byte buffer that only ever appends.
///
/// Content is always the in-order concatenation of every successful
/// [`append`](Self::append) since creation or the last [`clear`](Self::clear).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppendBuffer {
    buf: Vec<u8>,
}

impl AppendBuffer {
    /// Create an empty buffer. Nothing is allocated until the first append.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append `bytes` to the end of the buffer.
    ///
    /// If the buffer cannot grow, the append is dropped and a warning is
    /// logged; the buffer is unchanged.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if !self.grow(bytes.len()) {
            warn!(
                len = bytes.len(),
                buffered = self.buf.len(),
                "append buffer could not grow, dropping append"
            );
            return;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// Reserve room for exactly `additional` more bytes.
    fn grow(&mut self, additional: usize) -> bool {
        self.buf.try_reserve_exact(additional).is_ok()
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Take the accumulated bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Empty the buffer and release its storage.
    pub fn clear(&mut self) {
        self.buf = Vec::new();
    }

    /// Write the whole buffer to `w` in one `write_all`, then clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `w` fails. The buffer is
    /// kept so the caller can inspect what was not delivered.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.clear();
        }
        Ok(())
    }
}

/// Lets the `ansi` functions write straight into the buffer.
///
/// `write` always reports the full length, even when the append was
/// dropped; a failed grow is never surfaced as an I/O error.
impl Write for AppendBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn new_is_empty_and_unallocated() {
        let buf = AppendBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.buf.capacity(), 0);
    }

    #[test]
    fn append_concatenates() {
        let mut buf = AppendBuffer::new();
        buf.append(b"\x1b[H");
        buf.append(b"~");
        buf.append(b"\r\n");
        assert_eq!(buf.as_bytes(), b"\x1b[H~\r\n");
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn empty_append_is_noop() {
        let mut buf = AppendBuffer::new();
        buf.append(b"");
        assert!(buf.is_empty());
        assert_eq!(buf.buf.capacity(), 0);
    }

    #[test]
    fn growth_is_exact() {
        let mut buf = AppendBuffer::new();
        buf.append(b"abc");
        assert_eq!(buf.buf.capacity(), 3);
        buf.append(b"de");
        assert_eq!(buf.buf.capacity(), 5);
    }

    #[test]
    fn failed_grow_leaves_content_unchanged() {
        let mut buf = AppendBuffer::new();
        buf.append(b"frame");
        assert!(!buf.grow(usize::MAX));
        assert_eq!(buf.as_bytes(), b"frame");

        // Later appends still work.
        buf.append(b"!");
        assert_eq!(buf.as_bytes(), b"frame!");
    }

    #[test]
    fn clear_releases_storage() {
        let mut buf = AppendBuffer::new();
        buf.append(&[b'x'; 1024]);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.buf.capacity(), 0);
    }

    #[test]
    fn write_trait_feeds_ansi() {
        let mut buf = AppendBuffer::new();
        ansi::cursor_hide(&mut buf).unwrap();
        ansi::cursor_to(&mut buf, 0, 0).unwrap();
        assert_eq!(buf.as_bytes(), b"\x1b[?25l\x1b[1;1H");
    }

    #[test]
    fn flush_to_writes_once_and_clears() {
        /// Records the size of every write call.
        struct Recorder(Vec<usize>, Vec<u8>);
        impl Write for Recorder {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.push(buf.len());
                self.1.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut buf = AppendBuffer::new();
        buf.append(b"~\r\n");
        buf.append(b"~");
        let mut out = Recorder(Vec::new(), Vec::new());
        buf.flush_to(&mut out).unwrap();

        assert_eq!(out.0, vec![4]);
        assert_eq!(out.1, b"~\r\n~");
        assert!(buf.is_empty());
    }

    #[test]
    fn flush_empty_writes_nothing() {
        let mut buf = AppendBuffer::new();
        let mut out = Vec::new();
        buf.flush_to(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn flush_error_keeps_content() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut buf = AppendBuffer::new();
        buf.append(b"frame");
        assert!(buf.flush_to(&mut Broken).is_err());
        assert_eq!(buf.as_bytes(), b"frame");
    }

    proptest! {
        #[test]
        fn content_is_concatenation_of_appends(
            parts in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..512), 0..32)
        ) {
            let mut buf = AppendBuffer::new();
            for part in &parts {
                buf.append(part);
            }
            let expected: Vec<u8> = parts.concat();
            prop_assert_eq!(buf.as_bytes(), expected.as_slice());
            prop_assert_eq!(buf.len(), expected.len());
        }
    }
}
