// THEORY:
// The `RuleEngine` is the classification stage. It turns the geometric
// features of each candidate region into an accepted/rejected decision, and
// a whole feature set into a single pass/fail verdict with a human-readable
// message.
//
// Rule violations are first-class outcomes, not errors: nothing in this
// module ever fails. Per-feature validation is the conjunction of three
// independent inclusive range checks (area, circularity, aspect ratio); a
// feature failing any one of them is rejected outright.
//
// Aggregate validation follows a fixed priority so that exactly one message
// is produced per call: a count-enforcement mismatch wins over the zero-count
// case, which wins over the OK case.

use crate::config::{ConfigError, ConfigManager};
use crate::core_modules::region::RegionFeatures;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configurable geometric acceptance thresholds. All bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRules {
    pub min_area: f64,
    pub max_area: f64,
    pub min_circularity: f64,
    pub max_circularity: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Checked only when `enforce_count` is set.
    pub expected_count: usize,
    pub enforce_count: bool,
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self {
            min_area: 500.0,
            max_area: 50_000.0,
            min_circularity: 0.3,
            max_circularity: 1.0,
            min_aspect_ratio: 0.3,
            max_aspect_ratio: 3.0,
            expected_count: 0,
            enforce_count: false,
        }
    }
}

/// The aggregate outcome for one feature set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_valid: bool,
    pub message: String,
}

/// Applies `DetectionRules` to region features. Holds no state beyond the
/// rules themselves.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: DetectionRules,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rules(&mut self, rules: DetectionRules) {
        self.rules = rules;
    }

    pub fn rules(&self) -> &DetectionRules {
        &self.rules
    }

    /// Replaces the geometric thresholds with the `detection` section of a
    /// JSON config file. The count constraint is runtime-only configuration
    /// and is left untouched.
    pub fn load_rules(&mut self, path: &Path) -> Result<(), ConfigError> {
        let config = ConfigManager::load(path)?;
        let detection = &config.detection;
        self.rules = DetectionRules {
            min_area: detection.min_area,
            max_area: detection.max_area,
            min_circularity: detection.min_circularity,
            max_circularity: detection.max_circularity,
            min_aspect_ratio: detection.min_aspect_ratio,
            max_aspect_ratio: detection.max_aspect_ratio,
            expected_count: self.rules.expected_count,
            enforce_count: self.rules.enforce_count,
        };
        Ok(())
    }

    /// Accepts a feature record iff every range check passes.
    pub fn validate(&self, features: &RegionFeatures) -> bool {
        self.validate_area(features.area)
            && self.validate_circularity(features.circularity)
            && self.validate_aspect_ratio(features.aspect_ratio)
    }

    /// Produces the aggregate verdict for a full feature set.
    pub fn apply_rules<'a, I>(&self, features: I) -> Verdict
    where
        I: IntoIterator<Item = &'a RegionFeatures>,
    {
        let accepted = features.into_iter().filter(|f| self.validate(f)).count();

        if self.rules.enforce_count && accepted != self.rules.expected_count {
            return Verdict {
                is_valid: false,
                message: format!(
                    "Expected {} dough pieces, found {}",
                    self.rules.expected_count, accepted
                ),
            };
        }

        if accepted == 0 {
            return Verdict {
                is_valid: false,
                message: "No valid dough pieces detected".to_string(),
            };
        }

        Verdict {
            is_valid: true,
            message: "Detection OK".to_string(),
        }
    }

    fn validate_area(&self, area: f64) -> bool {
        area >= self.rules.min_area && area <= self.rules.max_area
    }

    fn validate_circularity(&self, circularity: f64) -> bool {
        circularity >= self.rules.min_circularity && circularity <= self.rules.max_circularity
    }

    fn validate_aspect_ratio(&self, ratio: f64) -> bool {
        ratio >= self.rules.min_aspect_ratio && ratio <= self.rules.max_aspect_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::region::BoundingBox;

    fn features(area: f64, circularity: f64, aspect_ratio: f64) -> RegionFeatures {
        RegionFeatures {
            area,
            perimeter: 1.0,
            circularity,
            bounding_box: BoundingBox { x: 0, y: 0, width: 10, height: 10 },
            aspect_ratio,
            centroid: (5.0, 5.0),
        }
    }

    #[test]
    fn validation_is_the_conjunction_of_all_three_checks() {
        let engine = RuleEngine::new();
        assert!(engine.validate(&features(2000.0, 0.9, 1.1)));
        assert!(!engine.validate(&features(100.0, 0.9, 1.1)), "area too small");
        assert!(!engine.validate(&features(2000.0, 0.1, 1.1)), "not circular enough");
        assert!(!engine.validate(&features(2000.0, 0.9, 5.0)), "too elongated");
    }

    #[test]
    fn all_bounds_are_inclusive() {
        let engine = RuleEngine::new();
        let rules = engine.rules().clone();
        assert!(engine.validate(&features(rules.min_area, rules.min_circularity, rules.min_aspect_ratio)));
        assert!(engine.validate(&features(rules.max_area, rules.max_circularity, rules.max_aspect_ratio)));
    }

    #[test]
    fn count_enforcement_takes_priority_and_cites_both_counts() {
        let mut engine = RuleEngine::new();
        engine.set_rules(DetectionRules {
            expected_count: 2,
            enforce_count: true,
            ..DetectionRules::default()
        });

        let set: Vec<_> = (0..3).map(|_| features(2000.0, 0.9, 1.1)).collect();
        let verdict = engine.apply_rules(set.iter());
        assert!(!verdict.is_valid);
        assert!(verdict.message.contains('2'));
        assert!(verdict.message.contains('3'));

        // Enforcement wins over the zero-count message as well.
        let verdict = engine.apply_rules(std::iter::empty::<&RegionFeatures>());
        assert!(!verdict.is_valid);
        assert!(verdict.message.contains("Expected 2"));
    }

    #[test]
    fn zero_accepted_without_enforcement_is_invalid() {
        let engine = RuleEngine::new();
        let verdict = engine.apply_rules(std::iter::empty::<&RegionFeatures>());
        assert!(!verdict.is_valid);
        assert_eq!(verdict.message, "No valid dough pieces detected");
    }

    #[test]
    fn any_accepted_feature_without_enforcement_is_valid() {
        let engine = RuleEngine::new();
        let set = [features(2000.0, 0.9, 1.1), features(1.0, 0.0, 0.0)];
        let verdict = engine.apply_rules(set.iter());
        assert!(verdict.is_valid);
        assert_eq!(verdict.message, "Detection OK");
    }
}
