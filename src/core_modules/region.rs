// THEORY:
// The `region` module defines the geometric vocabulary of the engine. A
// `Region` is one connected foreground component, reduced to its outer
// boundary polygon; `RegionFeatures` is the compact scalar summary derived
// from that polygon. Both are "dumb" data containers: they represent a
// detection within a single frame and carry no memory of previous frames.
//
// Key architectural principles:
// 1.  **Polygon as the single source of truth**: Every derived quantity (area,
//     perimeter, centroid) is computed from the boundary polygon via Green's
//     theorem / the shoelace formula, so all features agree with each other
//     by construction.
// 2.  **Compressed representation**: Boundary tracing yields every border
//     pixel. Collinear runs are collapsed to their endpoints, which leaves
//     the polygon (and therefore every feature) unchanged while keeping the
//     point lists small.
// 3.  **Total functions**: Degenerate regions produce well-defined zeros,
//     never NaN. Circularity is 0 when the perimeter is 0; aspect ratio is 0
//     when the bounding height is 0; the centroid is (0, 0) when the zeroth
//     moment vanishes.

use imageproc::point::Point;
use std::f64::consts::PI;

/// An axis-aligned bounding rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Smallest rectangle enclosing all of the given points. Empty input
    /// yields the zero-sized box at the origin.
    pub fn enclosing(points: &[Point<i32>]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        }
    }
}

/// One connected foreground component, represented by its outer boundary as
/// a simple closed polygon in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    points: Vec<Point<i32>>,
}

impl Region {
    /// Wraps a traced boundary, compressing collinear runs of points.
    pub fn from_boundary(points: Vec<Point<i32>>) -> Self {
        Self {
            points: compress_collinear(points),
        }
    }

    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::enclosing(&self.points)
    }

    /// Computes the full geometric feature record for this region. This is a
    /// raw computation; the noise-floor filtering lives in the extractor.
    pub fn features(&self) -> RegionFeatures {
        let area_signed = signed_area(&self.points);
        let area = area_signed.abs();
        let perimeter = closed_perimeter(&self.points);

        let circularity = if perimeter > 0.0 {
            (4.0 * PI * area) / (perimeter * perimeter)
        } else {
            0.0
        };

        let bounding_box = self.bounding_box();
        let aspect_ratio = if bounding_box.height > 0 {
            bounding_box.width as f64 / bounding_box.height as f64
        } else {
            0.0
        };

        RegionFeatures {
            area,
            perimeter,
            circularity,
            bounding_box,
            aspect_ratio,
            centroid: polygon_centroid(&self.points, area_signed),
        }
    }
}

/// Derived scalar summary of a single region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeatures {
    /// Pixel area enclosed by the boundary polygon (shoelace formula).
    pub area: f64,
    /// Length of the closed boundary.
    pub perimeter: f64,
    /// 4*pi*area / perimeter^2; 1.0 for a perfect circle, 0 when degenerate.
    pub circularity: f64,
    pub bounding_box: BoundingBox,
    /// Bounding width / bounding height; 0 when degenerate.
    pub aspect_ratio: f64,
    /// Area-weighted mean coordinate (first moment / zeroth moment).
    pub centroid: (f64, f64),
}

/// Removes interior points of straight runs. A point survives if the boundary
/// changes direction there; reversal points (a 180-degree turn on a one-pixel
/// spur) are kept so the polygon stays closed.
fn compress_collinear(points: Vec<Point<i32>>) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points;
    }
    let mut kept = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        let (ax, ay) = (cur.x - prev.x, cur.y - prev.y);
        let (bx, by) = (next.x - cur.x, next.y - cur.y);
        let cross = ax * by - ay * bx;
        let dot = ax * bx + ay * by;
        if cross != 0 || dot <= 0 {
            kept.push(cur);
        }
    }
    if kept.len() < 2 { points } else { kept }
}

/// Signed shoelace area of the closed polygon.
fn signed_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        sum += (p.x as f64) * (q.y as f64) - (q.x as f64) * (p.y as f64);
    }
    sum / 2.0
}

/// Sum of segment lengths around the closed polygon.
fn closed_perimeter(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let dx = (q.x - p.x) as f64;
        let dy = (q.y - p.y) as f64;
        sum += (dx * dx + dy * dy).sqrt();
    }
    sum
}

/// Polygon centroid via the first moments of Green's theorem. Falls back to
/// (0, 0) when the zeroth moment is zero.
fn polygon_centroid(points: &[Point<i32>], area_signed: f64) -> (f64, f64) {
    if area_signed == 0.0 {
        return (0.0, 0.0);
    }
    let n = points.len();
    let mut sx = 0.0;
    let mut sy = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let cross = (p.x as f64) * (q.y as f64) - (q.x as f64) * (p.y as f64);
        sx += (p.x as f64 + q.x as f64) * cross;
        sy += (p.y as f64 + q.y as f64) * cross;
    }
    (sx / (6.0 * area_signed), sy / (6.0 * area_signed))
}
