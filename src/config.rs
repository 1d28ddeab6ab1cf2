use std::fs;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_BAUD, DEFAULT_HEIGHT_SCALE};

/// Startup configuration. Everything here is fixed for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial device the telemetry stream arrives on, e.g. `/dev/ttyUSB0`.
    pub device: Option<String>,
    pub baud: u32,
    /// Display multiplier applied to the reported height.
    pub height_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            baud: DEFAULT_BAUD,
            height_scale: DEFAULT_HEIGHT_SCALE,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml_edit::de::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}
