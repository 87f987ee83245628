// THEORY:
// This file is the main entry point for the `dough_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API that will be exposed to external consumers (a host application,
// a binding layer, or the example runner).
//
// The primary goal is to export the `DoughVisionPipeline` and its associated
// data structures (`DetectionResult`, `DetectionRules`, `ColorBand`, ...) as
// the clean, high-level interface for the whole engine. The stage
// implementations live in `core_modules` and are reachable there for callers
// that need the individual pieces.

pub mod config;
pub mod core_modules;
pub mod pipeline;
pub mod registry;

// Re-export key data structures for the public API.
pub use crate::config::{ConfigError, ConfigManager, VisionConfig};
pub use crate::core_modules::color::{ColorBand, Hsv};
pub use crate::core_modules::extractor::{Detection, RegionExtractor};
pub use crate::core_modules::region::{BoundingBox, Region, RegionFeatures};
pub use crate::core_modules::rule_engine::{DetectionRules, RuleEngine, Verdict};
pub use crate::core_modules::segmenter::ColorSegmenter;
pub use crate::pipeline::{
    DETECTION_CONFIDENCE, DetectionResult, DoughVisionPipeline, RegionOfInterest,
};
pub use crate::registry::{Handle, PipelineRegistry};
