//! Editor — the loop that ties input, state, and output together.
//!
//! Each iteration renders the current view as one frame, waits for one key,
//! and applies it:
//!
//! - arrow keys move the cursor one cell (clamped to the window)
//! - Ctrl-Q ends the session
//! - everything else is ignored for now
//!
//! After Ctrl-Q no further frames are drawn. The loop homes the cursor and
//! clears the screen, so the clear-screen sequence is the last thing the
//! terminal receives.
//!
//! The loop is generic over its byte source and sink. The binary hands it
//! the raw terminal; tests hand it byte slices and a `Vec<u8>`.

use std::io::{Read, Write};

use tracing::{debug, info};

use kiln_term::ansi;
use kiln_term::input::{Key, KeyDecoder};
use kiln_term::output::AppendBuffer;
use kiln_term::terminal::Size;
use kiln_term::{Error, Result};

use crate::render::Renderer;
use crate::view::{Direction, ViewState};

/// Whether the editor is still taking input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    /// Absorbing: once here, keys are ignored and nothing is drawn.
    Terminated,
}

/// The editor application state.
#[derive(Debug, Clone)]
pub struct Editor {
    view: ViewState,
    renderer: Renderer,
    state: State,
}

impl Editor {
    /// An editor filling a window of `size`, cursor at the top-left.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self::with_renderer(size, Renderer::new())
    }

    #[must_use]
    pub fn with_renderer(size: Size, renderer: Renderer) -> Self {
        Self {
            view: ViewState::new(size),
            renderer,
            state: State::Running,
        }
    }

    #[inline]
    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Apply one key and return the resulting state.
    pub fn apply(&mut self, key: Key) -> State {
        if self.state == State::Terminated {
            return self.state;
        }

        match key {
            Key::Quit => {
                info!("quit requested");
                self.state = State::Terminated;
            }
            key => {
                if let Some(direction) = Direction::from_key(key) {
                    self.view.move_cursor(direction);
                }
            }
        }

        self.state
    }

    /// Render the current view and write it to `out` in one piece.
    /// Does nothing once terminated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the frame cannot be written.
    pub fn refresh_screen(&self, out: &mut impl Write) -> Result<()> {
        if self.state == State::Terminated {
            return Ok(());
        }
        self.renderer
            .render_frame(&self.view)
            .flush_to(out)
            .map_err(Error::Write)
    }

    /// Run until Ctrl-Q, then clear the screen.
    ///
    /// # Errors
    ///
    /// Returns the first read or write failure. The screen is left as it
    /// was; clearing it on the way out is up to the caller.
    pub fn run<R: Read, W: Write>(&mut self, keys: &mut KeyDecoder<R>, out: &mut W) -> Result<()> {
        info!(rows = self.view.rows(), cols = self.view.cols(), "editor started");

        while self.is_running() {
            self.refresh_screen(out)?;
            let key = keys.read_key()?;
            self.apply(key);
            debug!(
                row = self.view.cursor_row(),
                col = self.view.cursor_col(),
                "cursor"
            );
        }

        clear_screen(out)
    }
}

/// Home the cursor and clear the screen, in one write.
///
/// # Errors
///
/// Returns [`Error::Write`] if writing to `out` fails.
pub fn clear_screen(out: &mut impl Write) -> Result<()> {
    let mut buf = AppendBuffer::new();
    ansi::cursor_home(&mut buf).ok();
    ansi::clear_screen(&mut buf).ok();
    buf.flush_to(out).map_err(Error::Write)
}
