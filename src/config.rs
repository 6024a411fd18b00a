//! Runtime settings, loadable from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! [browser]
//! executable = "/usr/bin/chromium"
//!
//! [extractor]
//! navigation_timeout_secs = 45
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub extractor: ExtractorSettings,
    pub renderer: RendererSettings,
}

impl Settings {
    /// Parse settings from TOML. Missing tables and keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// How the headless browser process is started.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Chromium binary; detected automatically when unset.
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub sandbox: bool,
    /// Extra command-line flags passed to Chromium.
    pub args: Vec<String>,
    pub launch_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            sandbox: false,
            args: Vec::new(),
            launch_timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub navigation_timeout_secs: u64,
    pub selector_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub poll_interval_ms: u64,
    /// Maximum number of body-text characters kept for parsing.
    pub preview_chars: usize,
}

impl ExtractorSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 30,
            selector_timeout_secs: 10,
            settle_delay_ms: 2000,
            poll_interval_ms: 250,
            preview_chars: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub ready_timeout_secs: u64,
    /// Extra wait after the page is ready, for web fonts.
    pub font_delay_ms: u64,
    pub poll_interval_ms: u64,
}

impl RendererSettings {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn font_delay(&self) -> Duration {
        Duration::from_millis(self.font_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            ready_timeout_secs: 10,
            font_delay_ms: 1000,
            poll_interval_ms: 100,
        }
    }
}
