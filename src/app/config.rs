//! Configuration for the log buffer and renderer

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::renderer::DEFAULT_COLUMN_PADDING;

/// Largest accepted column separator, in pixels
pub const MAX_COLUMN_PADDING: usize = 64;

/// fblog configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Surface width assumed at init, in pixels
    pub initial_width: usize,
    /// Surface height assumed at init, in pixels
    pub initial_height: usize,
    /// Preferred glyph width
    pub font_width: usize,
    /// Preferred glyph height
    pub font_height: usize,
    /// Column count given to panic framebuffers
    pub panic_columns: usize,
    /// Separator width between columns, in pixels
    pub column_padding: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_width: 800,
            initial_height: 600,
            font_width: 8,
            font_height: 16,
            panic_columns: 1,
            column_padding: DEFAULT_COLUMN_PADDING,
        }
    }
}

impl Config {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from the default location or return the defaults
    pub fn load_or_default() -> Self {
        // Try ~/.config/fblog/config.json
        if let Some(config_dir) = dirs_config_path() {
            let config_path = config_dir.join("config.json");
            if config_path.exists() {
                match Self::load_from_file(&config_path) {
                    Ok(config) => return config,
                    Err(e) => log::warn!("Ignoring {}: {}", config_path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// Check that every field is usable
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("initial_width", self.initial_width),
            ("initial_height", self.initial_height),
            ("font_width", self.font_width),
            ("font_height", self.font_height),
            ("panic_columns", self.panic_columns),
            ("column_padding", self.column_padding),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| *value == 0) {
            return Err(Error::InvalidConfig(format!("{} must be non-zero", name)));
        }
        if self.column_padding >= MAX_COLUMN_PADDING {
            return Err(Error::InvalidConfig(format!(
                "column_padding must be below {}",
                MAX_COLUMN_PADDING
            )));
        }
        Ok(())
    }
}

/// Get the configuration directory path
fn dirs_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("fblog"))
}
