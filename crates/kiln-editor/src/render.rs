//! Renderer — one frame, one buffer, one write.
//!
//! [`Renderer::render_frame`] turns a [`ViewState`] into the complete byte
//! payload for a screen refresh:
//!
//! ```text
//! hide cursor, home
//! ~                              ← one row per screen line,
//! ~                                each followed by erase-to-EOL
//! ~        Kiln editor -- ...    ← banner at rows / 3
//! ~
//! cursor to (row+1, col+1), show cursor
//! ```
//!
//! Rows are joined with `\r\n`, with no break after the last row, so the
//! terminal never scrolls. Rendering is pure: the same view always yields
//! the same bytes, and nothing touches the terminal until the caller
//! flushes the returned buffer.

use std::borrow::Cow;

use tracing::trace;
use unicode_width::UnicodeWidthChar;

use kiln_term::ansi;
use kiln_term::output::AppendBuffer;

use crate::view::ViewState;

/// The welcome banner shown when there is no document.
pub const WELCOME: &str = concat!("Kiln editor -- version ", env!("CARGO_PKG_VERSION"));

/// Marker drawn at the start of every line past the end of the document.
const TILDE: &[u8] = b"~";

/// Composes frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    banner: Cow<'static, str>,
}

impl Renderer {
    /// A renderer showing the default [`WELCOME`] banner.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            banner: Cow::Borrowed(WELCOME),
        }
    }

    /// A renderer showing a custom banner.
    #[must_use]
    pub fn with_banner(banner: impl Into<Cow<'static, str>>) -> Self {
        Self {
            banner: banner.into(),
        }
    }

    /// Compose a full frame for `view`.
    #[must_use]
    pub fn render_frame(&self, view: &ViewState) -> AppendBuffer {
        let mut out = AppendBuffer::new();

        ansi::cursor_hide(&mut out).ok();
        ansi::cursor_home(&mut out).ok();

        self.draw_rows(&mut out, view);

        ansi::cursor_to(&mut out, view.cursor_col(), view.cursor_row()).ok();
        ansi::cursor_show(&mut out).ok();

        trace!(rows = view.rows(), cols = view.cols(), bytes = out.len(), "frame");
        out
    }

    fn draw_rows(&self, out: &mut AppendBuffer, view: &ViewState) {
        let rows = view.rows();
        let banner_row = rows / 3;

        for y in 0..rows {
            if y == banner_row {
                out.append(banner_line(&self.banner, view.cols()).as_bytes());
            } else {
                out.append(TILDE);
            }

            ansi::erase_line(out).ok();

            if y + 1 < rows {
                out.append(b"\r\n");
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lay `banner` out centered on a line `cols` cells wide.
///
/// Text wider than the line is cut at the last character that still fits.
/// The left padding starts with a `~` (the line is still past the end of
/// the document) followed by spaces.
#[must_use]
pub fn banner_line(banner: &str, cols: u16) -> String {
    let cols = usize::from(cols);

    let mut width = 0;
    let mut end = 0;
    for (i, ch) in banner.char_indices() {
        let w = ch.width().unwrap_or(0);
        if width + w > cols {
            break;
        }
        width += w;
        end = i + ch.len_utf8();
    }
    let text = &banner[..end];

    let mut padding = (cols - width) / 2;
    let mut line = String::with_capacity(padding + text.len());
    if padding > 0 {
        line.push('~');
        padding -= 1;
    }
    line.extend(std::iter::repeat_n(' ', padding));
    line.push_str(text);
    line
}
