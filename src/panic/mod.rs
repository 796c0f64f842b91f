//! Crash Path Module
//!
//! Surfaces registered ahead of time and the hook that draws the log into
//! them when the process panics.

mod hook;
mod registry;

pub use hook::{install, report, MAX_PANIC_MESSAGE};
pub use registry::{PanicHandle, PanicRegistry};
