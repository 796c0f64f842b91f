//! Process log state
//!
//! [`LogState`] is the context object every operation goes through: it owns
//! the published ring buffer, the published font, and the serialization
//! token that orders cooperative writers against resizes. It is constructed
//! explicitly and passed around (usually in an `Arc`), so tests can run
//! isolated instances side by side.
//!
//! Lifecycle: [`LogState::init`] picks a font and allocates the first buffer;
//! [`LogState::shutdown`] unpublishes and frees both, leaving the state as if
//! it was never initialized. Both are idempotent. The caller must make sure
//! no reader or writer runs concurrently with `shutdown`.
//!
//! Lock order: the token is always taken before any read guard of the font
//! cell, since `shutdown` replaces the font while holding the token.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::epoch::EpochCell;
use super::ring::RingBuffer;
use super::writer::{write_lines, SafetyMode, WritePath};
use crate::app::Config;
use crate::error::{Error, Result};
use crate::renderer::{self, Font, FontHint, FontProvider, Surface};

/// Shared log buffer state
pub struct LogState {
    /// Static configuration
    config: Config,
    /// Font chosen at init, cleared on shutdown
    font: EpochCell<Font>,
    /// Currently published buffer
    buffer: EpochCell<RingBuffer>,
    /// Serializes cooperative writers, resizes, init and shutdown
    token: Mutex<()>,
}

impl LogState {
    /// Create an uninitialized (disabled) state
    pub fn new(config: Config) -> Self {
        Self {
            config,
            font: EpochCell::empty(),
            buffer: EpochCell::empty(),
            token: Mutex::new(()),
        }
    }

    /// Create and initialize a state in one go
    pub fn with_fonts(config: Config, fonts: &dyn FontProvider) -> Self {
        let state = Self::new(config);
        state.init(fonts);
        state
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Copy of the current font, if one is published
    pub fn font(&self) -> Option<Font> {
        self.font.read().get().cloned()
    }

    /// Check whether a buffer is published and writes/renders do anything
    pub fn is_enabled(&self) -> bool {
        self.font.is_set() && self.buffer.is_set()
    }

    /// Initialize: pick a font and allocate the first buffer.
    ///
    /// Returns whether the subsystem is enabled afterwards. Without a font
    /// the state stays disabled and every operation is a no-op.
    pub fn init(&self, fonts: &dyn FontProvider) -> bool {
        if self.is_enabled() {
            return true;
        }

        let chosen = {
            let _token = self.lock_token();
            if self.font.is_set() {
                None
            } else {
                let hint = FontHint {
                    screen_width: self.config.initial_width,
                    screen_height: self.config.initial_height,
                    preferred_width: self.config.font_width,
                    preferred_height: self.config.font_height,
                };
                let found = fonts.find_font(&hint);
                let described = found
                    .as_ref()
                    .map(|font| (font.name(), font.width(), font.height()));
                if let Some(font) = found {
                    drop(self.font.replace(Some(Box::new(font))));
                }
                Some(described)
            }
        };

        match chosen {
            Some(Some((name, width, height))) => {
                log::info!("Using font {} ({}x{})", name, width, height);
            }
            Some(None) => {
                log::error!("Cannot get font description, disabling fblog");
                return false;
            }
            None => {}
        }

        if let Err(e) = self.ensure_size(self.config.initial_width, self.config.initial_height) {
            log::warn!("Failed to allocate initial log buffer: {}", e);
        }
        self.is_enabled()
    }

    /// Unpublish and free the buffer and the font after a grace period
    pub fn shutdown(&self) {
        let (buffer, font) = {
            let _token = self.lock_token();
            (self.buffer.replace(None), self.font.replace(None))
        };
        if buffer.is_some() || font.is_some() {
            log::info!("fblog shut down");
        }
    }

    fn lock_token(&self) -> MutexGuard<'_, ()> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write `data` into the log.
    ///
    /// `Locked` waits for the serialization token. `BestEffort` never waits:
    /// if the token is busy it writes into the published buffer without it
    /// and accepts lost or torn lines (see [`WritePath`]).
    pub fn write(&self, data: &[u8], mode: SafetyMode) {
        if data.is_empty() {
            return;
        }

        let path = WritePath::acquire(&self.token, mode);
        let guard = self.buffer.read();
        if let Some(buf) = guard.get() {
            write_lines(buf, data);
        }
        drop(guard);
        drop(path);
    }

    /// Make sure the buffer can fill a `width_px` x `height_px` surface.
    ///
    /// Returns `Ok(true)` if a bigger buffer was published, `Ok(false)` if
    /// the current one is big enough or no font is published. The old buffer
    /// is freed only after every in-flight reader let go of it. On
    /// allocation failure the previous buffer stays in place.
    pub fn ensure_size(&self, width_px: usize, height_px: usize) -> Result<bool> {
        let grown = {
            let _token = self.lock_token();
            let grown = {
                let font = self.font.read();
                let Some(font) = font.get() else {
                    return Ok(false);
                };
                let current = self.buffer.read();
                RingBuffer::resize_if_needed(current.get(), width_px, height_px, font)
            };
            match grown {
                Ok(Some(buf)) => {
                    let geometry = (buf.width(), buf.height());
                    drop(self.buffer.replace(Some(Box::new(buf))));
                    Ok(Some(geometry))
                }
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            }
        };

        match grown {
            Ok(Some((width, height))) => {
                log::debug!("Log buffer resized to {}x{} cells", width, height);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                log::warn!("Log buffer resize failed: {}", e);
                Err(e)
            }
        }
    }

    /// Render the current log into `surface`.
    ///
    /// Never blocks and never allocates. A no-op while disabled.
    pub fn draw(&self, surface: &mut Surface<'_>) {
        let font = self.font.read();
        let Some(font) = font.get() else {
            return;
        };
        let guard = self.buffer.read();
        if let Some(buf) = guard.get() {
            renderer::render(buf, font, surface, self.config.column_padding);
        }
    }

    /// Draw centered banner lines into `surface` (independent of the log)
    pub fn draw_banner(&self, surface: &mut Surface<'_>, lines: &[&str]) {
        if let Some(font) = self.font.read().get() {
            renderer::draw_banner(font, surface, lines);
        }
    }

    /// Draw the static panic screen (banner plus logo) into `surface`
    pub fn draw_panic_screen(&self, surface: &mut Surface<'_>) {
        if let Some(font) = self.font.read().get() {
            renderer::draw_panic_screen(font, surface);
        }
    }

    /// Run `f` against the current buffer, if one is published
    pub fn with_buffer<R>(&self, f: impl FnOnce(&RingBuffer) -> R) -> Option<R> {
        let guard = self.buffer.read();
        guard.get().map(f)
    }

    /// Current buffer geometry in cells
    pub fn buffer_size(&self) -> Option<(usize, usize)> {
        self.with_buffer(|buf| (buf.width(), buf.height()))
    }

    /// Copy of the current font, or [`Error::NoFont`] while disabled
    pub fn require_font(&self) -> Result<Font> {
        self.font().ok_or(Error::NoFont)
    }
}

impl Default for LogState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ring::RESIZE_MESSAGE;
    use crate::renderer::{BuiltinFonts, Geometry, PixelFormat};

    struct NoFonts;

    impl FontProvider for NoFonts {
        fn find_font(&self, _hint: &FontHint) -> Option<Font> {
            None
        }
    }

    fn state() -> LogState {
        LogState::with_fonts(Config::default(), &BuiltinFonts)
    }

    #[test]
    fn test_init_allocates_buffer() {
        let state = state();
        assert!(state.is_enabled());
        // 800x600 with an 8x16 font, doubled
        assert_eq!(state.buffer_size(), Some((200, 74)));
        let newest = state.with_buffer(|b| b.recent(0).unwrap().text()).unwrap();
        assert_eq!(newest, RESIZE_MESSAGE);
    }

    #[test]
    fn test_init_twice_is_noop() {
        let state = state();
        state.write(b"keep me", SafetyMode::Locked);
        assert!(state.init(&BuiltinFonts));
        let newest = state
            .with_buffer(|b| b.recent(0).unwrap().to_string_lossy())
            .unwrap();
        assert_eq!(newest, "keep me");
    }

    #[test]
    fn test_missing_font_disables() {
        let state = LogState::with_fonts(Config::default(), &NoFonts);
        assert!(!state.is_enabled());
        assert!(matches!(state.require_font(), Err(Error::NoFont)));

        state.write(b"dropped", SafetyMode::Locked);
        assert_eq!(state.ensure_size(1920, 1080).unwrap(), false);

        let mut pixels = vec![0x55u8; 64 * 64 * 4];
        let geometry = Geometry::new(64, 64, 64 * 4, 4, PixelFormat::XRGB8888, 1);
        let mut surface = Surface::new(&mut pixels, geometry).unwrap();
        state.draw(&mut surface);
        assert!(pixels.iter().all(|&b| b == 0x55));
    }

    #[test]
    fn test_shutdown_twice_is_noop() {
        let state = state();
        state.shutdown();
        assert!(!state.is_enabled());
        state.shutdown();
        state.write(b"after shutdown", SafetyMode::BestEffort);
        assert!(state.buffer_size().is_none());
    }

    #[test]
    fn test_shutdown_forgets_font() {
        let state = state();
        state.shutdown();
        assert!(state.font().is_none());

        // Behaves like a state that was never initialized
        assert_eq!(state.ensure_size(800, 600).unwrap(), false);
        assert!(!state.is_enabled());
        assert_eq!(state.buffer_size(), None);

        assert!(!state.init(&NoFonts));
        assert!(!state.is_enabled());

        state.shutdown();
        assert!(state.init(&BuiltinFonts));
        assert_eq!(state.buffer_size(), Some((200, 74)));
    }

    #[test]
    fn test_ensure_size_grows_and_keeps_text() {
        let state = state();
        state.write(b"before resize", SafetyMode::Locked);
        assert!(state.ensure_size(3840, 2160).unwrap());
        assert_eq!(state.buffer_size(), Some((960, 270)));

        let previous = state
            .with_buffer(|b| b.recent(1).unwrap().to_string_lossy())
            .unwrap();
        assert_eq!(previous, "before resize");
        assert!(!state.ensure_size(1024, 768).unwrap());
    }

    #[test]
    fn test_best_effort_write_while_token_held() {
        let state = state();
        let _held = state.lock_token();
        state.write(b"from the fault handler", SafetyMode::BestEffort);
        let newest = state
            .with_buffer(|b| b.recent(0).unwrap().to_string_lossy())
            .unwrap();
        assert_eq!(newest, "from the fault handler");
    }
}
