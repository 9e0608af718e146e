use std::path::{Path, PathBuf};
use std::time::Duration;

use embedded_graphics::prelude::Size;
use serde::{Deserialize, Serialize};

use crate::backend::Key;
use crate::error::{GuiError, Result};

/// Engine settings. Every field may be omitted from a TOML file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub display: DisplayConfig,
    /// Sleep between event loop iterations; also the effective input latency.
    pub poll_interval_ms: u64,
    /// How long a clicked button stays in its clicked colors.
    pub flash_ms: u64,
    pub screenshot_path: PathBuf,
    pub screenshot_key: Key,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            poll_interval_ms: 50,
            flash_ms: 100,
            screenshot_path: PathBuf::from("screenshot.tga"),
            screenshot_key: Key::F12,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(GuiError::ConfigIo)?;
        Self::from_toml_str(&text)
    }

    pub fn display_size(&self) -> Size {
        Size::new(self.display.width, self.display.height)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }
}
