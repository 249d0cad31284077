//! Capture configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `backdrop.ron` file (if exists)
//! 3. Environment variables prefixed with `EXP3_`
//!
//! Command line flags override all of them.
//!
//! Example environment variable: `EXP3_CAPTURE__FPS=24`

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackdropConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub blobs: BlobsConfig,

    #[serde(default)]
    pub scene: SceneFileConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

/// Offscreen viewport size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub width: u16,
    pub height: u16,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
        }
    }
}

/// Frame timing and output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub fps: u16,
    pub frames: usize,
    /// `.gif` for an animation, `.png` for the last frame
    pub output: String,
    /// Fixed seed for reproducible captures; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            frames: 90,
            output: "backdrop.gif".to_string(),
            seed: None,
        }
    }
}

/// Blob field settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobsConfig {
    /// Category key (`all`, `reading`, `forum`, `coming-soon`)
    pub category: String,
}

impl Default for BlobsConfig {
    fn default() -> Self {
        Self {
            category: "all".to_string(),
        }
    }
}

/// Optional RON scene roster replacing the built-in one
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SceneFileConfig {
    #[serde(default)]
    pub file: Option<String>,
}

/// Debug/development settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DebugConfig {
    /// Enable verbose logging
    pub verbose_logging: bool,
}

impl BackdropConfig {
    /// Load defaults, `backdrop.ron` from the working directory and `EXP3_*`
    /// environment variables.
    pub fn load() -> Result<Self> {
        Self::build(
            Self::defaults()?.add_source(
                File::with_name("backdrop")
                    .format(config::FileFormat::Ron)
                    .required(false),
            ),
        )
    }

    /// Like [`BackdropConfig::load`] but reading a specific RON file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let name = path
            .to_str()
            .with_context(|| format!("Config path is not valid UTF-8: {}", path.display()))?;
        Self::build(
            Self::defaults()?.add_source(
                File::with_name(name)
                    .format(config::FileFormat::Ron)
                    .required(true),
            ),
        )
    }

    fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>> {
        let builder = Config::builder()
            .set_default("viewport.width", 640_i64)?
            .set_default("viewport.height", 360_i64)?
            .set_default("capture.fps", 30_i64)?
            .set_default("capture.frames", 90_i64)?
            .set_default("capture.output", "backdrop.gif")?
            .set_default("blobs.category", "all")?
            .set_default("debug.verbose_logging", false)?;
        Ok(builder)
    }

    fn build(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config = builder
            // Environment variables (EXP3_CAPTURE__FPS, etc.) win over files
            .add_source(Environment::with_prefix("EXP3").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
