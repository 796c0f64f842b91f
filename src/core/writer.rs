//! Log writer
//!
//! Splits an incoming byte stream into physical lines and appends them to a
//! [`RingBuffer`]. A line ends at `\n` or after `width` bytes, whichever
//! comes first. A width split marks the following line as a continuation of
//! the same logical message; a newline starts a fresh one.
//!
//! Writers pick one of two paths through [`WritePath::acquire`]:
//!
//! - **Cooperative** holds the serialization token, so it is ordered against
//!   resizes and other cooperative writers. It may block waiting for it.
//! - **Unsynchronized** is what [`SafetyMode::BestEffort`] falls back to when
//!   the token is busy. It writes straight into the currently published
//!   buffer. A resize running at the same time may drop these lines, and two
//!   such writers may tear each other's lines. Memory safety is unaffected:
//!   the buffer stays pinned by the read guard and every field is atomic.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use super::ring::RingBuffer;

/// How a write synchronizes with resizes and other writers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SafetyMode {
    /// Wait for the serialization token
    #[default]
    Locked,
    /// Never wait; degrade to an unsynchronized write if the token is busy
    BestEffort,
}

/// The path a single write takes
pub(crate) enum WritePath<'a> {
    /// Serialization token held for the duration of the write
    Cooperative(MutexGuard<'a, ()>),
    /// Token was busy; writing without it
    Unsynchronized,
}

impl<'a> WritePath<'a> {
    /// Acquire the path for `mode`.
    ///
    /// A poisoned token is still usable: the data it protects is `()` and
    /// the panic path has to keep working after another thread panicked.
    pub(crate) fn acquire(token: &'a Mutex<()>, mode: SafetyMode) -> Self {
        match mode {
            SafetyMode::Locked => {
                WritePath::Cooperative(token.lock().unwrap_or_else(PoisonError::into_inner))
            }
            SafetyMode::BestEffort => match token.try_lock() {
                Ok(guard) => WritePath::Cooperative(guard),
                Err(TryLockError::Poisoned(poisoned)) => {
                    WritePath::Cooperative(poisoned.into_inner())
                }
                Err(TryLockError::WouldBlock) => WritePath::Unsynchronized,
            },
        }
    }

    /// Check whether the token is held
    pub(crate) fn is_cooperative(&self) -> bool {
        matches!(self, WritePath::Cooperative(_))
    }
}

/// Tokenize `data` into lines and append them to `buf`
pub fn write_lines(buf: &RingBuffer, data: &[u8]) {
    let width = buf.width();
    let mut continuation = false;
    let mut rest = data;

    while !rest.is_empty() {
        let window = &rest[..rest.len().min(width)];
        match window.iter().position(|&c| c == b'\n') {
            Some(newline) => {
                buf.append(&rest[..newline], continuation);
                continuation = false;
                rest = &rest[newline + 1..];
            }
            None => {
                buf.append(window, continuation);
                continuation = true;
                rest = &rest[window.len()..];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(buf: &RingBuffer, count: usize) -> Vec<(String, bool)> {
        (0..count)
            .rev()
            .map(|k| {
                let line = buf.recent(k).unwrap();
                (line.to_string_lossy(), line.is_continuation())
            })
            .collect()
    }

    #[test]
    fn test_write_single_line() {
        let buf = RingBuffer::allocate(80, 25).unwrap();
        write_lines(&buf, b"hello");
        assert_eq!(texts(&buf, 1), vec![("hello".to_string(), false)]);
    }

    #[test]
    fn test_write_splits_on_newline() {
        let buf = RingBuffer::allocate(80, 25).unwrap();
        write_lines(&buf, b"one\ntwo\n");
        assert_eq!(buf.cursor(), 2);
        assert_eq!(
            texts(&buf, 2),
            vec![("one".to_string(), false), ("two".to_string(), false)]
        );
    }

    #[test]
    fn test_write_wraps_at_width() {
        let buf = RingBuffer::allocate(80, 25).unwrap();
        let data = vec![b'x'; 95];
        write_lines(&buf, &data);

        let head = buf.recent(1).unwrap();
        let tail = buf.recent(0).unwrap();
        assert_eq!(head.len(), 80);
        assert!(!head.is_continuation());
        assert_eq!(tail.len(), 15);
        assert!(tail.is_continuation());
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_write_newline_resets_continuation() {
        let buf = RingBuffer::allocate(4, 25).unwrap();
        write_lines(&buf, b"abcdef\ngh");
        assert_eq!(
            texts(&buf, 3),
            vec![
                ("abcd".to_string(), false),
                ("ef".to_string(), true),
                ("gh".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_write_exact_width_then_newline() {
        let buf = RingBuffer::allocate(4, 25).unwrap();
        write_lines(&buf, b"abcd\nef");
        assert_eq!(
            texts(&buf, 2),
            vec![("abcd".to_string(), false), ("ef".to_string(), false)]
        );
    }

    #[test]
    fn test_write_skips_blank_lines() {
        let buf = RingBuffer::allocate(80, 25).unwrap();
        write_lines(&buf, b"\n\n\n");
        assert_eq!(buf.cursor(), 0);
        write_lines(&buf, b"");
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_write_wraps_around_ring() {
        let buf = RingBuffer::allocate(80, 25).unwrap();
        for i in 0..26 {
            write_lines(&buf, format!("line {}", i).as_bytes());
        }
        for k in 0..25 {
            let expected = format!("line {}", 25 - k);
            assert_eq!(buf.recent(k).unwrap().to_string_lossy(), expected);
        }
    }

    #[test]
    fn test_write_path_best_effort_falls_back() {
        let token = Mutex::new(());
        let held = token.lock().unwrap();
        let path = WritePath::acquire(&token, SafetyMode::BestEffort);
        assert!(!path.is_cooperative());
        drop(path);
        drop(held);

        let path = WritePath::acquire(&token, SafetyMode::BestEffort);
        assert!(path.is_cooperative());
    }

    #[test]
    fn test_write_path_recovers_poisoned_token() {
        let token = std::sync::Arc::new(Mutex::new(()));
        let poison = std::sync::Arc::clone(&token);
        let _ = std::thread::spawn(move || {
            let _guard = poison.lock().unwrap();
            panic!("poison the token");
        })
        .join();

        assert!(token.is_poisoned());
        assert!(WritePath::acquire(&token, SafetyMode::Locked).is_cooperative());
        assert!(WritePath::acquire(&token, SafetyMode::BestEffort).is_cooperative());
    }
}
