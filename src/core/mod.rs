//! Log Core Module
//!
//! The crash-survivable log store. This module contains:
//! - Line storage with atomic cells
//! - The fixed-geometry ring buffer and its grow-by-copy resize
//! - The backward entry walk used by the renderer
//! - Grace-period publication of the current buffer
//! - The writer/tokenizer and the shared `LogState`
//!
//! Every field a reader can see is atomic, so a best-effort writer racing a
//! renderer can garble text but never memory.

mod entries;
mod epoch;
mod line;
mod ring;
mod state;
mod writer;

pub use entries::{Entries, Entry, RevChars};
pub use epoch::{EpochCell, ReadGuard};
pub use line::Line;
pub use ring::{RingBuffer, MIN_COLUMNS, MIN_ROWS, RESIZE_MESSAGE};
pub use state::LogState;
pub use writer::{write_lines, SafetyMode};
