//! Application glue module
//!
//! Configuration shared by the library and the headless tool.

mod config;

pub use config::{Config, MAX_COLUMN_PADDING};
