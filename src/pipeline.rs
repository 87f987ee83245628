// THEORY:
// The `pipeline` module is the top-level API for the detection engine. The
// `DoughVisionPipeline` owns all configuration state (color band, region of
// interest, detection rules) and sequences the three per-frame stages:
// segmentation, region extraction, and rule evaluation.
//
// Key architectural principles:
// 1.  **One-directional data flow**: raw frame -> optional ROI crop -> mask ->
//     feature list -> verdict -> assembled `DetectionResult`. No stage feeds
//     back into an earlier one, and nothing except configuration survives
//     from one frame to the next.
// 2.  **All mutation routes through the coordinator**: runtime setters for the
//     band, ROI, and thresholds forward to the owned components. No external
//     code holds a separate mutable reference to rule or config state.
// 3.  **Results, not errors**: an empty frame or a call before `initialize`
//     produces a zero-count invalid result with an explanatory message.
//     Nothing in a frame's processing panics or returns `Err`.
// 4.  **Intentional asymmetry**: the aggregate verdict is computed over ALL
//     extracted features, while the returned region list holds only the
//     individually accepted ones. Aggregate rules such as count enforcement
//     must see every candidate; the visual output reflects accepted pieces.

use crate::config::{ConfigError, ConfigManager, VisionConfig};
use crate::core_modules::annotator;
use crate::core_modules::color::ColorBand;
use crate::core_modules::extractor::{Detection, RegionExtractor};
use crate::core_modules::region::{BoundingBox, Region};
use crate::core_modules::rule_engine::{DetectionRules, RuleEngine};
use crate::core_modules::segmenter::ColorSegmenter;
use image::{GrayImage, RgbImage, imageops};
use std::path::Path;
use tracing::{debug, warn};

/// Fixed confidence reported whenever at least one region is accepted. A
/// placeholder signal rather than a calibrated probability; the only promised
/// property is that confidence is 0 iff the accepted count is 0.
pub const DETECTION_CONFIDENCE: f64 = 0.85;

/// An axis-aligned processing window. Zero width or height means "no
/// restriction, use the full frame".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionOfInterest {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl RegionOfInterest {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// The zero-sized ROI, i.e. process the whole frame.
    pub fn full_frame() -> Self {
        Self::default()
    }

    /// Intersects the ROI with the frame bounds. Returns `None` when no crop
    /// should happen: either the ROI is unset or it falls entirely outside
    /// the frame.
    fn clamped_to(&self, frame_width: u32, frame_height: u32) -> Option<(u32, u32, u32, u32)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let x = self.x.max(0) as u32;
        let y = self.y.max(0) as u32;
        if x >= frame_width || y >= frame_height {
            return None;
        }
        let width = self.width.min(frame_width - x);
        let height = self.height.min(frame_height - y);
        Some((x, y, width, height))
    }
}

/// The output of one pipeline run. Constructed fresh per frame.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Boundaries of the individually accepted regions, in extraction order.
    pub regions: Vec<Region>,
    /// Bounding rectangles of the accepted regions, index-aligned with
    /// `regions`.
    pub bounding_boxes: Vec<BoundingBox>,
    pub dough_count: usize,
    pub is_valid: bool,
    /// 0.0 when nothing was accepted, `DETECTION_CONFIDENCE` otherwise.
    pub confidence: f64,
    pub message: String,
}

impl DetectionResult {
    fn rejected(message: &str) -> Self {
        Self {
            regions: Vec::new(),
            bounding_boxes: Vec::new(),
            dough_count: 0,
            is_valid: false,
            confidence: 0.0,
            message: message.to_string(),
        }
    }
}

/// The frame pipeline coordinator. One instance per logical session; calls
/// are synchronous and the design assumes at most one in-flight frame per
/// instance.
pub struct DoughVisionPipeline {
    segmenter: ColorSegmenter,
    extractor: RegionExtractor,
    rule_engine: RuleEngine,
    roi: RegionOfInterest,
    is_initialized: bool,
    segmented_mask: Option<GrayImage>,
    annotated_frame: Option<RgbImage>,
}

impl Default for DoughVisionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl DoughVisionPipeline {
    pub fn new() -> Self {
        Self {
            segmenter: ColorSegmenter::new(),
            extractor: RegionExtractor::new(),
            rule_engine: RuleEngine::new(),
            roi: RegionOfInterest::full_frame(),
            is_initialized: false,
            segmented_mask: None,
            annotated_frame: None,
        }
    }

    /// Loads configuration and arms the pipeline. A missing or unreadable
    /// config is not a failure: the built-in defaults (yellow/beige band,
    /// full-frame ROI, default rules) are applied instead.
    pub fn initialize(&mut self, config_path: Option<&Path>) -> bool {
        let config = match config_path {
            Some(path) => match ConfigManager::load(path) {
                Ok(config) => config,
                Err(err) => {
                    warn!(error = %err, path = %path.display(), "could not load config, using defaults");
                    VisionConfig::default()
                }
            },
            None => VisionConfig::default(),
        };
        self.apply_config(&config);
        self.is_initialized = true;
        true
    }

    fn apply_config(&mut self, config: &VisionConfig) {
        self.segmenter.set_color_band(ColorBand::from_scalars(
            config.color_segmentation.lower,
            config.color_segmentation.upper,
        ));
        self.segmenter.set_morph_kernel_size(config.processing.morph_kernel_size);
        self.segmenter.set_cleanup_enabled(config.processing.enable_preprocessing);
        self.roi = RegionOfInterest::new(
            config.roi.x,
            config.roi.y,
            config.roi.width,
            config.roi.height,
        );

        // The count constraint is runtime-only state; keep it across reloads.
        let counts = self.rule_engine.rules().clone();
        self.rule_engine.set_rules(DetectionRules {
            min_area: config.detection.min_area,
            max_area: config.detection.max_area,
            min_circularity: config.detection.min_circularity,
            max_circularity: config.detection.max_circularity,
            min_aspect_ratio: config.detection.min_aspect_ratio,
            max_aspect_ratio: config.detection.max_aspect_ratio,
            expected_count: counts.expected_count,
            enforce_count: counts.enforce_count,
        });
    }

    /// Runs the full per-frame sequence and assembles the result.
    pub fn process_frame(&mut self, frame: &RgbImage) -> DetectionResult {
        if frame.width() == 0 || frame.height() == 0 || !self.is_initialized {
            return DetectionResult::rejected("Invalid frame or not initialized");
        }

        let roi_frame = match self.roi.clamped_to(frame.width(), frame.height()) {
            Some((x, y, width, height)) => imageops::crop_imm(frame, x, y, width, height).to_image(),
            None => frame.clone(),
        };

        let mask = self.segmenter.segment(&roi_frame);
        let regions = self.extractor.find_regions(&mask);
        let detections = self.extractor.extract_features(regions);

        let accepted: Vec<&Detection> = detections
            .iter()
            .filter(|d| self.rule_engine.validate(&d.features))
            .collect();

        // The verdict sees every candidate, accepted or not.
        let verdict = self.rule_engine.apply_rules(detections.iter().map(|d| &d.features));

        let annotated = annotator::annotate(&roi_frame, &accepted);
        let regions_out: Vec<Region> = accepted.iter().map(|d| d.region.clone()).collect();
        let bounding_boxes: Vec<BoundingBox> =
            accepted.iter().map(|d| d.features.bounding_box).collect();
        let dough_count = regions_out.len();

        debug!(
            candidates = detections.len(),
            dough_count,
            is_valid = verdict.is_valid,
            "frame processed"
        );

        self.segmented_mask = Some(mask);
        self.annotated_frame = Some(annotated);

        DetectionResult {
            regions: regions_out,
            bounding_boxes,
            dough_count,
            is_valid: verdict.is_valid,
            confidence: if dough_count > 0 { DETECTION_CONFIDENCE } else { 0.0 },
            message: verdict.message,
        }
    }

    // Runtime mutators. All configuration mutation routes through here.

    pub fn set_color_band(&mut self, band: ColorBand) {
        self.segmenter.set_color_band(band);
    }

    pub fn set_roi(&mut self, roi: RegionOfInterest) {
        self.roi = roi;
    }

    pub fn set_min_area(&mut self, area: f64) {
        let mut rules = self.rule_engine.rules().clone();
        rules.min_area = area;
        self.rule_engine.set_rules(rules);
    }

    pub fn set_max_area(&mut self, area: f64) {
        let mut rules = self.rule_engine.rules().clone();
        rules.max_area = area;
        self.rule_engine.set_rules(rules);
    }

    pub fn set_rules(&mut self, rules: DetectionRules) {
        self.rule_engine.set_rules(rules);
    }

    pub fn rules(&self) -> &DetectionRules {
        self.rule_engine.rules()
    }

    /// Replaces the geometric thresholds from the `detection` section of a
    /// config file, leaving everything else untouched.
    pub fn load_rules(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.rule_engine.load_rules(path)
    }

    /// The binary mask of the most recent frame, for external inspection.
    pub fn segmented_mask(&self) -> Option<&GrayImage> {
        self.segmented_mask.as_ref()
    }

    /// The annotated copy of the most recent (cropped) frame.
    pub fn annotated_frame(&self) -> Option<&RgbImage> {
        self.annotated_frame.as_ref()
    }
}
