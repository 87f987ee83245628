// THEORY:
// The `config` module is the serde mirror of the on-disk JSON configuration
// store. The schema is nested by section (`color_segmentation`, `roi`,
// `detection`, `camera`, `processing`) and every top-level section defaults
// independently when absent; there is deliberately no all-or-nothing
// validation across sections.
//
// The error taxonomy matters more than the happy path here: an absent or
// unreadable file (`ConfigError::Io`) is an expected condition that callers
// recover from by falling back to defaults, while a present-but-malformed
// file (`ConfigError::Parse`) is the one configuration failure worth
// surfacing distinctly.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The full configuration record, one field per JSON section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VisionConfig {
    #[serde(default)]
    pub color_segmentation: ColorSection,
    #[serde(default)]
    pub roi: RoiSection,
    #[serde(default)]
    pub detection: DetectionSection,
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub processing: ProcessingSection,
}

/// HSV band bounds as raw scalar triples, matching the store's layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSection {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

impl Default for ColorSection {
    fn default() -> Self {
        Self {
            lower: [20.0, 50.0, 50.0],
            upper: [40.0, 255.0, 255.0],
        }
    }
}

/// Region of interest; zero width or height means "use the full frame".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RoiSection {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSection {
    pub min_area: f64,
    pub max_area: f64,
    pub min_circularity: f64,
    pub max_circularity: f64,
    // Aspect bounds were added after the first deployments; older files that
    // omit them must keep loading.
    #[serde(default = "default_min_aspect_ratio")]
    pub min_aspect_ratio: f64,
    #[serde(default = "default_max_aspect_ratio")]
    pub max_aspect_ratio: f64,
}

fn default_min_aspect_ratio() -> f64 {
    0.3
}

fn default_max_aspect_ratio() -> f64 {
    3.0
}

impl Default for DetectionSection {
    fn default() -> Self {
        Self {
            min_area: 500.0,
            max_area: 50_000.0,
            min_circularity: 0.3,
            max_circularity: 1.0,
            min_aspect_ratio: default_min_aspect_ratio(),
            max_aspect_ratio: default_max_aspect_ratio(),
        }
    }
}

/// Consumed only by the external capture collaborator; carried here so the
/// store stays a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSection {
    pub index: i32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSection {
    pub morph_kernel_size: u32,
    pub enable_preprocessing: bool,
}

impl Default for ProcessingSection {
    fn default() -> Self {
        Self {
            morph_kernel_size: 5,
            enable_preprocessing: true,
        }
    }
}

/// Loads and persists `VisionConfig` documents.
pub struct ConfigManager;

impl ConfigManager {
    /// Reads a config file. An unreadable file maps to `ConfigError::Io`,
    /// malformed or type-inconsistent content to `ConfigError::Parse`.
    pub fn load(path: &Path) -> Result<VisionConfig, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Writes the config as pretty-printed JSON.
    pub fn save(path: &Path, config: &VisionConfig) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(config)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
