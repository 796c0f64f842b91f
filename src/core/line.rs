//! Log line representation
//!
//! A line is one physical row of the log buffer: a fixed number of byte cells
//! plus a length and a continuation flag. All three are updated with plain
//! atomic stores and no combined commit, so a concurrent reader may observe a
//! new length next to old cell bytes. Readers are expected to tolerate that;
//! the next render pass picks up the settled state.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use crate::error::{Error, Result};

/// A row of byte cells in the log buffer
#[derive(Debug)]
pub struct Line {
    /// Number of valid cells, never larger than `cells.len()`
    length: AtomicUsize,
    /// True if this line continues the logical message of the previous line
    continuation: AtomicBool,
    /// Cell storage, fixed at allocation time
    cells: Box<[AtomicU8]>,
}

impl Line {
    /// Allocate a zeroed line with `width` cells.
    ///
    /// Uses a fallible reservation so an allocation failure surfaces as
    /// [`Error::Alloc`] instead of aborting.
    pub fn allocate(width: usize) -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(width)
            .map_err(|_| Error::Alloc { width, height: 1 })?;
        cells.extend((0..width).map(|_| AtomicU8::new(0)));

        Ok(Self {
            length: AtomicUsize::new(0),
            continuation: AtomicBool::new(false),
            cells: cells.into_boxed_slice(),
        })
    }

    /// Cell capacity of this line
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    /// Number of valid cells
    pub fn len(&self) -> usize {
        self.length.load(Ordering::Relaxed).min(self.cells.len())
    }

    /// Check if the line holds no text
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this line continues the previous one
    pub fn is_continuation(&self) -> bool {
        self.continuation.load(Ordering::Relaxed)
    }

    /// Get the byte in cell `index`, if it exists
    pub fn cell(&self, index: usize) -> Option<u8> {
        self.cells.get(index).map(|c| c.load(Ordering::Relaxed))
    }

    /// Overwrite the line with `data` (truncated to the width).
    ///
    /// Cells first, then length, then the continuation flag. No ordering is
    /// promised between the three; the buffer cursor publication is what
    /// readers synchronize on.
    pub(crate) fn store(&self, data: &[u8], continuation: bool) {
        let len = data.len().min(self.cells.len());
        for (cell, &byte) in self.cells.iter().zip(&data[..len]) {
            cell.store(byte, Ordering::Relaxed);
        }
        self.length.store(len, Ordering::Relaxed);
        self.continuation.store(continuation, Ordering::Relaxed);
    }

    /// Copy the content and flags of another line into this one
    pub(crate) fn copy_from(&self, other: &Line) {
        let len = other.len().min(self.cells.len());
        for (dst, src) in self.cells.iter().zip(other.cells.iter()).take(len) {
            dst.store(src.load(Ordering::Relaxed), Ordering::Relaxed);
        }
        self.length.store(len, Ordering::Relaxed);
        self.continuation
            .store(other.is_continuation(), Ordering::Relaxed);
    }

    /// Copy out the valid cells
    pub fn text(&self) -> Vec<u8> {
        let len = self.len();
        self.cells[..len]
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// Extract the text content as a (lossy) string
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.text()).into_owned()
    }
}
