//! Backward walk over logical log entries
//!
//! The renderer works bottom-up: it starts at the newest line and needs the
//! full length of each logical message (head line plus all its wrapped
//! continuations) before it can lay the message out. [`Entries`] yields one
//! [`Entry`] per logical message, newest first, and [`Entry::chars_rev`]
//! pulls that message's bytes back out from the last one to the first.

use super::line::Line;
use super::ring::RingBuffer;

/// One logical message, possibly spanning several physical lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Slot of the newest physical line of this message
    pub slot: usize,
    /// Total number of characters over all physical lines
    pub len: usize,
    /// Number of physical lines coalesced into this entry
    pub lines: usize,
}

/// Iterator over logical entries, newest first
pub struct Entries<'a> {
    buf: &'a RingBuffer,
    slot: usize,
    visited: usize,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(buf: &'a RingBuffer) -> Self {
        Self {
            buf,
            slot: buf.cursor(),
            visited: 0,
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        let start = self.slot;
        let mut len = 0;
        let mut lines = 0;

        // Coalesce continuation lines, but never walk past the oldest slot
        while self.visited < self.buf.height() {
            let line = self.buf.line(self.slot)?;
            self.visited += 1;
            self.slot = self.buf.prev_slot(self.slot);

            len += line.len();
            lines += 1;
            if !line.is_continuation() {
                break;
            }
        }

        if lines == 0 {
            return None;
        }

        Some(Entry {
            slot: start,
            len,
            lines,
        })
    }
}

impl Entry {
    /// Pull this entry's characters from last to first
    pub fn chars_rev<'a>(&self, buf: &'a RingBuffer) -> RevChars<'a> {
        let line = buf.line(self.slot);
        RevChars {
            buf,
            slot: self.slot,
            pos: line.map_or(0, Line::len),
            line,
            remaining_lines: self.lines,
        }
    }
}

/// Characters of one entry in reverse order.
///
/// Ends early (returns `None`) when the lines turn out shorter than they were
/// when the entry was measured, which happens when a best-effort writer
/// overwrote them mid-render.
pub struct RevChars<'a> {
    buf: &'a RingBuffer,
    slot: usize,
    pos: usize,
    line: Option<&'a Line>,
    remaining_lines: usize,
}

impl<'a> Iterator for RevChars<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        while self.pos == 0 {
            self.remaining_lines = self.remaining_lines.saturating_sub(1);
            if self.remaining_lines == 0 {
                return None;
            }
            self.slot = self.buf.prev_slot(self.slot);
            self.line = self.buf.line(self.slot);
            self.pos = self.line.map_or(0, Line::len);
        }

        self.pos -= 1;
        self.line?.cell(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::writer::write_lines;

    #[test]
    fn test_entries_empty_buffer() {
        let buf = RingBuffer::allocate(80, 4).unwrap();
        let entries: Vec<Entry> = buf.entries().collect();
        // Every empty slot is its own zero-length entry
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.len == 0 && e.lines == 1));
    }

    #[test]
    fn test_entries_coalesce_continuations() {
        let buf = RingBuffer::allocate(4, 8).unwrap();
        write_lines(&buf, b"hello world\nok");

        let mut entries = buf.entries();
        let newest = entries.next().unwrap();
        assert_eq!(newest.len, 2);
        assert_eq!(newest.lines, 1);

        let wrapped = entries.next().unwrap();
        assert_eq!(wrapped.len, 11);
        assert_eq!(wrapped.lines, 3);
    }

    #[test]
    fn test_entries_stop_after_full_lap() {
        let buf = RingBuffer::allocate(2, 3).unwrap();
        // Every line is a continuation: one entry covers the whole buffer
        write_lines(&buf, b"aabbccdd");
        let entries: Vec<Entry> = buf.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lines, 3);
    }

    #[test]
    fn test_chars_rev_spans_lines() {
        let buf = RingBuffer::allocate(4, 8).unwrap();
        write_lines(&buf, b"abcdefg");
        let entry = buf.entries().next().unwrap();
        let text: Vec<u8> = entry.chars_rev(&buf).collect();
        assert_eq!(text, b"gfedcba");
    }

    #[test]
    fn test_chars_rev_detects_shortened_line() {
        let buf = RingBuffer::allocate(4, 8).unwrap();
        write_lines(&buf, b"abcdefg");
        let entry = buf.entries().next().unwrap();

        // A racing writer shortens the head line after measurement
        buf.line(entry.slot - 1).unwrap().store(b"x", false);
        let count = entry.chars_rev(&buf).count();
        assert!(count < entry.len);
    }
}
