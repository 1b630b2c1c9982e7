//! # kiln-editor — Editor core for kiln
//!
//! The state and behavior that sit on top of kiln-term's terminal engine:
//!
//! - **[`view`]** — `ViewState`: window size plus cursor, and cursor movement
//! - **[`render`]** — `Renderer`: composes one full frame into an append buffer
//! - **[`editor`]** — `Editor`: the render → read key → apply loop
//!
//! There is no document yet. Every row past the (empty) text shows a `~`,
//! and a welcome banner sits a third of the way down the screen.

pub mod editor;
pub mod render;
pub mod view;
