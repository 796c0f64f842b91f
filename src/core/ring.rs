//! Log ring buffer
//!
//! A fixed-capacity circular store of [`Line`]s with a monotonic write
//! cursor. Geometry never changes after allocation; growing the log means
//! allocating a bigger buffer with [`RingBuffer::resize_if_needed`] and
//! publishing it in place of the old one.
//!
//! Slot `(cursor - k) mod height` holds the k-th most recent line.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::entries::Entries;
use super::line::Line;
use crate::error::{Error, Result};
use crate::renderer::Font;

/// Minimum number of cells per line
pub const MIN_COLUMNS: usize = 80;

/// Minimum number of lines
pub const MIN_ROWS: usize = 25;

/// Diagnostic appended to every freshly grown buffer
pub const RESIZE_MESSAGE: &[u8] = b"fblog: log resized";

/// Circular buffer of log lines
#[derive(Debug)]
pub struct RingBuffer {
    /// Cells per line
    width: usize,
    /// Number of lines
    height: usize,
    /// Slot of the most recently written line
    cursor: AtomicUsize,
    /// Line storage, `height` entries
    lines: Box<[Line]>,
}

impl RingBuffer {
    /// Allocate a zeroed buffer of `height` lines with `width` cells each.
    pub fn allocate(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry { width, height });
        }

        let mut lines = Vec::new();
        lines
            .try_reserve_exact(height)
            .map_err(|_| Error::Alloc { width, height })?;
        for _ in 0..height {
            let line = Line::allocate(width).map_err(|_| Error::Alloc { width, height })?;
            lines.push(line);
        }

        Ok(Self {
            width,
            height,
            cursor: AtomicUsize::new(0),
            lines: lines.into_boxed_slice(),
        })
    }

    /// Cells per line
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of lines
    pub fn height(&self) -> usize {
        self.height
    }

    /// Slot of the most recently written line
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Get the line stored in `slot`
    pub fn line(&self, slot: usize) -> Option<&Line> {
        self.lines.get(slot)
    }

    /// Get the k-th most recent line (0 = newest)
    pub fn recent(&self, k: usize) -> Option<&Line> {
        if k >= self.height {
            return None;
        }
        let slot = (self.cursor() + self.height - k) % self.height;
        self.lines.get(slot)
    }

    /// Slot preceding `slot`, wrapping around
    pub(crate) fn prev_slot(&self, slot: usize) -> usize {
        if slot == 0 {
            self.height - 1
        } else {
            slot - 1
        }
    }

    /// Append one physical line after the cursor.
    ///
    /// The slot content is written before the cursor is advanced with
    /// release ordering, so a reader that sees the new cursor sees data at
    /// least that fresh. Two unsynchronized appenders may pick the same slot;
    /// the result is a lost or torn line, never an out-of-bounds access.
    pub(crate) fn append(&self, data: &[u8], continuation: bool) {
        if data.is_empty() {
            return;
        }

        let mut slot = self.cursor.load(Ordering::Relaxed) + 1;
        if slot >= self.height {
            slot = 0;
        }

        self.lines[slot].store(data, continuation);
        self.cursor.store(slot, Ordering::Release);
    }

    /// Walk logical entries from the newest line backward
    pub fn entries(&self) -> Entries<'_> {
        Entries::new(self)
    }

    /// Compute the grown buffer needed for a `min_width_px` x `min_height_px`
    /// surface, if any.
    ///
    /// Returns `Ok(None)` when `current` already covers the requirement. A
    /// new buffer is twice the union of the old and the required geometry;
    /// it receives a copy of every old line, oldest first, followed by
    /// [`RESIZE_MESSAGE`]. The caller publishes it and retires the old one.
    pub fn resize_if_needed(
        current: Option<&RingBuffer>,
        min_width_px: usize,
        min_height_px: usize,
        font: &Font,
    ) -> Result<Option<RingBuffer>> {
        let mut width = MIN_COLUMNS.max(min_width_px / font.width().max(1));
        let mut height = MIN_ROWS.max(min_height_px / font.height().max(1));

        if let Some(old) = current {
            width = width.max(old.width);
            height = height.max(old.height);
            if width == old.width && height == old.height {
                return Ok(None);
            }
        }

        let width = width.checked_mul(2).ok_or(Error::Alloc { width, height })?;
        let height = height
            .checked_mul(2)
            .ok_or(Error::Alloc { width, height })?;
        let buf = RingBuffer::allocate(width, height)?;

        if let Some(old) = current {
            let count = old.height.min(buf.height);
            let mut slot = (old.cursor() + 1) % old.height;
            for i in 0..count {
                buf.lines[i].copy_from(&old.lines[slot]);
                slot = (slot + 1) % old.height;
            }
            buf.cursor.store(count - 1, Ordering::Release);
        }

        buf.append(RESIZE_MESSAGE, false);
        Ok(Some(buf))
    }
}
