use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Top-level Visor configuration, loaded from visor.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisorConfig {
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub pixmap: PixmapConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// How draws and render-pass transitions outside their scope are handled
    #[serde(default)]
    pub render_pass_scope: RenderPassScope,
}

/// Render-pass scope enforcement during replay.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum RenderPassScope {
    /// Reject draws outside a render pass, nested begins, unmatched ends,
    /// and streams that finish inside a render pass (default)
    #[default]
    #[serde(rename = "strict")]
    Strict,
    /// Log the violation and keep replaying
    #[serde(rename = "permissive")]
    Permissive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixmapConfig {
    /// Largest accepted width or height
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// LZ4-compress capture payloads
    #[serde(default = "default_true")]
    pub compress: bool,
    /// Streams at or below this size are stored uncompressed
    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: usize,
}

impl Default for PixmapConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            compress: true,
            compression_threshold: default_compression_threshold(),
        }
    }
}

impl VisorConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, CoreError> {
        toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Load configuration from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(CoreError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring invalid config {}: {}", path, e);
                Self::default()
            }
        }
    }
}

/// Returns the default config file path.
/// Search order:
/// 1. System-wide config: `/etc/visor/visor.toml`
/// 2. Local fallback: `./visor.toml`
pub fn default_config_path() -> String {
    let system_path = "/etc/visor/visor.toml";
    if std::path::Path::new(system_path).exists() {
        return system_path.to_string();
    }
    "visor.toml".to_string()
}

fn default_max_dimension() -> u32 {
    crate::pixmap::DEFAULT_MAX_DIMENSION
}

fn default_compression_threshold() -> usize {
    visor_protocol::wire::DEFAULT_COMPRESSION_THRESHOLD
}

fn default_true() -> bool {
    true
}
