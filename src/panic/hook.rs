//! Process panic hook
//!
//! Chains in front of the current hook: the panic message goes into the log
//! buffer in best-effort mode, every mapped panic framebuffer is redrawn,
//! then the previous hook runs as usual.

use std::fmt::Write;
use std::panic;
use std::sync::Arc;

use super::registry::PanicRegistry;
use crate::core::{LogState, SafetyMode};
use crate::sink::StackBuf;

/// Longest panic message kept; the rest is cut off
pub const MAX_PANIC_MESSAGE: usize = 512;

/// Write a panic report and redraw every registered framebuffer.
///
/// Safe to call from any thread at any time; allocates nothing and never
/// waits for the serialization token.
pub fn report(
    state: &LogState,
    registry: &PanicRegistry,
    message: &dyn std::fmt::Display,
) -> usize {
    let mut line = StackBuf::<MAX_PANIC_MESSAGE>::new();
    let _ = write!(line, "{}", message);
    state.write(line.as_bytes(), SafetyMode::BestEffort);
    registry.notify_panic(state)
}

/// Install the crash notifier as the process panic hook
pub fn install(state: Arc<LogState>, registry: Arc<PanicRegistry>) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        report(&state, &registry, info);
        previous(info);
    }));
}
