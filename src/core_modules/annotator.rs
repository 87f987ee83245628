// Overlay drawing for the diagnostic output frame: accepted boundaries in
// green, bounding boxes in blue, centroid dots in red. Purely presentational;
// the data it consumes is exactly what `DetectionResult` already carries.

use crate::core_modules::extractor::Detection;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

const BOUNDARY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const CENTROID_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CENTROID_RADIUS: i32 = 5;

/// Returns a copy of `frame` with the accepted detections drawn on top.
pub fn annotate(frame: &RgbImage, accepted: &[&Detection]) -> RgbImage {
    let mut canvas = frame.clone();
    for detection in accepted {
        draw_boundary(&mut canvas, detection.region.points());

        let b = detection.features.bounding_box;
        if b.width > 0 && b.height > 0 {
            draw_hollow_rect_mut(&mut canvas, Rect::at(b.x, b.y).of_size(b.width, b.height), BOX_COLOR);
        }

        let (cx, cy) = detection.features.centroid;
        draw_filled_circle_mut(
            &mut canvas,
            (cx.round() as i32, cy.round() as i32),
            CENTROID_RADIUS,
            CENTROID_COLOR,
        );
    }
    canvas
}

fn draw_boundary(canvas: &mut RgbImage, points: &[Point<i32>]) {
    if points.len() < 2 {
        return;
    }
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        draw_line_segment_mut(
            canvas,
            (p.x as f32, p.y as f32),
            (q.x as f32, q.y as f32),
            BOUNDARY_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::region::Region;

    #[test]
    fn no_detections_leaves_the_frame_untouched() {
        let frame = RgbImage::from_pixel(20, 20, Rgb([9, 9, 9]));
        let annotated = annotate(&frame, &[]);
        assert_eq!(annotated, frame);
    }

    #[test]
    fn accepted_detection_marks_the_frame() {
        let frame = RgbImage::from_pixel(40, 40, Rgb([9, 9, 9]));
        let region = Region::from_boundary(vec![
            Point::new(10, 10),
            Point::new(30, 10),
            Point::new(30, 30),
            Point::new(10, 30),
        ]);
        let features = region.features();
        let detection = Detection { region, features };

        let annotated = annotate(&frame, &[&detection]);
        assert_ne!(annotated, frame);
        // The hollow box is drawn after the boundary and shares its top edge.
        assert_eq!(*annotated.get_pixel(20, 10), BOX_COLOR);
        assert_eq!(*annotated.get_pixel(20, 20), CENTROID_COLOR);
    }
}
