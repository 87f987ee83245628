// THEORY:
// The `RegionExtractor` is the spatial analysis stage. It reduces the binary
// mask produced by the segmenter into an ordered list of candidate dough
// pieces, each represented by a `Region` boundary and its `RegionFeatures`.
//
// Key architectural principles:
// 1.  **External retrieval only**: boundary tracing distinguishes outer
//     boundaries from the boundaries of holes. Only the outer ones are kept;
//     a piece of dough with a flour-dusted hole in the mask is still one
//     piece.
// 2.  **Unconditional noise floor**: anything with a raw enclosed area below
//     `MIN_REGION_AREA` is discarded before features are derived. This is a
//     fixed pre-filter, independent of the configurable area thresholds the
//     rule engine applies later.
// 3.  **Stateless utility**: like the segmenter, the extractor holds no state
//     between frames. Output order follows mask scan order and is stable
//     within a single call, but carries no further meaning.

use crate::core_modules::region::{Region, RegionFeatures};
use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};

/// Regions whose raw enclosed area falls below this floor are dropped before
/// feature extraction.
pub const MIN_REGION_AREA: f64 = 100.0;

/// A surviving candidate: the boundary polygon paired with its features.
#[derive(Debug, Clone)]
pub struct Detection {
    pub region: Region,
    pub features: RegionFeatures,
}

/// Stateless connected-region discovery and feature computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionExtractor;

impl RegionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Traces all connected foreground components of the mask and returns
    /// their outer boundaries in scan order. Hole boundaries are discarded.
    pub fn find_regions(&self, mask: &GrayImage) -> Vec<Region> {
        if mask.width() == 0 || mask.height() == 0 {
            return Vec::new();
        }
        find_contours::<i32>(mask)
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer)
            .map(|contour| Region::from_boundary(contour.points))
            .collect()
    }

    /// Applies the noise floor and computes features for the survivors,
    /// preserving discovery order.
    pub fn extract_features(&self, regions: Vec<Region>) -> Vec<Detection> {
        regions
            .into_iter()
            .filter_map(|region| {
                let features = region.features();
                if features.area < MIN_REGION_AREA {
                    None
                } else {
                    Some(Detection { region, features })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::segmenter::FOREGROUND;

    fn fill_rect(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32, value: u8) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, image::Luma([value]));
            }
        }
    }

    #[test]
    fn noise_floor_drops_area_99_and_keeps_area_100() {
        let extractor = RegionExtractor::new();

        // A 10x12 block encloses a 9x11 polygon: area 99, below the floor.
        let mut small = GrayImage::new(50, 50);
        fill_rect(&mut small, 10, 10, 10, 12, FOREGROUND);
        let detections = extractor.extract_features(extractor.find_regions(&small));
        assert!(detections.is_empty());

        // An 11x11 block encloses a 10x10 polygon: area exactly 100, kept.
        let mut kept = GrayImage::new(50, 50);
        fill_rect(&mut kept, 10, 10, 11, 11, FOREGROUND);
        let detections = extractor.extract_features(extractor.find_regions(&kept));
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].features.area, 100.0);
    }

    #[test]
    fn hole_boundaries_are_discarded() {
        let mut mask = GrayImage::new(60, 60);
        fill_rect(&mut mask, 10, 10, 30, 30, FOREGROUND);
        fill_rect(&mut mask, 20, 20, 10, 10, 0);

        let regions = RegionExtractor::new().find_regions(&mask);
        assert_eq!(regions.len(), 1, "only the outer boundary should remain");
    }

    #[test]
    fn discovery_order_follows_mask_scan_order() {
        let mut mask = GrayImage::new(80, 80);
        fill_rect(&mut mask, 40, 5, 20, 20, FOREGROUND);
        fill_rect(&mut mask, 5, 50, 20, 20, FOREGROUND);

        let extractor = RegionExtractor::new();
        let detections = extractor.extract_features(extractor.find_regions(&mask));
        assert_eq!(detections.len(), 2);
        assert!(
            detections[0].features.bounding_box.y < detections[1].features.bounding_box.y,
            "regions should be reported in scan order"
        );
    }

    #[test]
    fn empty_mask_yields_no_regions() {
        let extractor = RegionExtractor::new();
        assert!(extractor.find_regions(&GrayImage::new(0, 0)).is_empty());
        assert!(extractor.find_regions(&GrayImage::new(10, 10)).is_empty());
    }
}
