//! `log` facade sink
//!
//! Forwards every log record into a [`LogState`], one line per record, so
//! the regular application log ends up in the crash-survivable buffer.
//! Records are formatted into a fixed stack buffer; nothing here allocates
//! per record.

use std::fmt;
use std::sync::Arc;
use std::thread;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::core::{LogState, SafetyMode};

/// Longest record forwarded; anything beyond is cut off
pub const MAX_RECORD_LEN: usize = 1024;

/// Fixed-capacity formatting target living on the stack.
///
/// Output beyond `N` bytes is dropped and formatting reports an error, so a
/// `write!` into it stops at the first overflow.
pub struct StackBuf<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> StackBuf<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check whether output was cut off
    pub fn is_full(&self) -> bool {
        self.len == N
    }
}

impl<const N: usize> Default for StackBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for StackBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = N - self.len;
        let take = s.len().min(room);
        self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        if take < s.len() {
            Err(fmt::Error)
        } else {
            Ok(())
        }
    }
}

/// `log::Log` implementation writing into a [`LogState`]
pub struct LogSink {
    state: Arc<LogState>,
    level: LevelFilter,
}

impl LogSink {
    /// Forward records at `Info` and above
    pub fn new(state: Arc<LogState>) -> Self {
        Self {
            state,
            level: LevelFilter::Info,
        }
    }

    /// Change the most verbose level forwarded
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Install as the global logger
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    /// Format one record as a log line
    fn format(record: &Record<'_>) -> StackBuf<MAX_RECORD_LEN> {
        use std::fmt::Write;

        let mut line = StackBuf::new();
        let _ = write!(line, "[{} {}] {}", record.level(), record.target(), record.args());
        // The newline is always kept so a cut-off record does not merge
        // with the next one
        if line.is_full() {
            line.len -= 1;
        }
        let _ = line.write_char('\n');
        line
    }
}

impl Log for LogSink {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format(record);
        // A panicking thread may hold the token already
        let mode = if thread::panicking() {
            SafetyMode::BestEffort
        } else {
            SafetyMode::Locked
        };
        self.state.write(line.as_bytes(), mode);
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Config;
    use crate::renderer::BuiltinFonts;
    use std::fmt::Write;

    fn newest(state: &LogState, k: usize) -> String {
        state
            .with_buffer(|buf| buf.recent(k).unwrap().to_string_lossy())
            .unwrap()
    }

    #[test]
    fn test_stack_buf_truncates() {
        let mut buf = StackBuf::<4>::new();
        assert!(write!(buf, "ab").is_ok());
        assert!(write!(buf, "cdef").is_err());
        assert_eq!(buf.as_bytes(), b"abcd");
        assert!(buf.is_full());
    }

    fn emit(sink: &LogSink, level: log::Level, target: &str, args: fmt::Arguments<'_>) {
        sink.log(&Record::builder().level(level).target(target).args(args).build());
    }

    #[test]
    fn test_sink_formats_record() {
        let state = Arc::new(LogState::with_fonts(Config::default(), &BuiltinFonts));
        let sink = LogSink::new(Arc::clone(&state));

        emit(&sink, log::Level::Warn, "drm", format_args!("mode {} failed", 3));
        assert_eq!(newest(&state, 0), "[WARN drm] mode 3 failed");
    }

    #[test]
    fn test_sink_filters_level() {
        let state = Arc::new(LogState::with_fonts(Config::default(), &BuiltinFonts));
        let sink = LogSink::new(Arc::clone(&state)).with_level(LevelFilter::Warn);

        emit(&sink, log::Level::Info, "drm", format_args!("quiet"));
        assert_ne!(newest(&state, 0), "[INFO drm] quiet");
    }

    #[test]
    fn test_sink_long_record_keeps_newline() {
        let state = Arc::new(LogState::with_fonts(Config::default(), &BuiltinFonts));
        let sink = LogSink::new(Arc::clone(&state));
        let long = "x".repeat(2 * MAX_RECORD_LEN);

        let formatted = LogSink::format(
            &Record::builder()
                .level(log::Level::Error)
                .target("t")
                .args(format_args!("{}", long))
                .build(),
        );
        assert_eq!(formatted.len(), MAX_RECORD_LEN);
        assert_eq!(formatted.as_bytes().last(), Some(&b'\n'));

        emit(&sink, log::Level::Error, "t", format_args!("{}", long));
        emit(&sink, log::Level::Error, "t", format_args!("after"));
        assert_eq!(newest(&state, 0), "[ERROR t] after");
    }
}
