// THEORY:
// The `color` module holds the colorimetric vocabulary of the engine: the HSV
// representation used for thresholding and the `ColorBand` that defines which
// pixels count as dough. The RGB→HSV transform is a fixed, well-defined
// conversion and is deliberately not configurable; tuning happens exclusively
// through the band bounds.
//
// The component scaling follows the convention the rest of the configuration
// schema was written against: hue in half-degrees (0..=179), saturation and
// value as full bytes (0..=255). Band bounds arriving from the config store or
// a binding layer are doubles and are clamped into that byte range.

use image::Rgb;

/// A single color expressed in hue/saturation/value space.
/// Hue is in half-degrees (0..=179), saturation and value in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// An inclusive lower/upper pair of HSV bounds defining the foreground band.
/// Invariant: each lower component must be <= the corresponding upper
/// component; a violated band simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBand {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl ColorBand {
    pub fn new(lower: Hsv, upper: Hsv) -> Self {
        Self { lower, upper }
    }

    /// Builds a band from raw scalar triples (h, s, v), as delivered by the
    /// config store or a binding layer. Components are clamped into 0..=255.
    pub fn from_scalars(lower: [f64; 3], upper: [f64; 3]) -> Self {
        let clamp = |c: [f64; 3]| Hsv {
            h: c[0].clamp(0.0, 255.0) as u8,
            s: c[1].clamp(0.0, 255.0) as u8,
            v: c[2].clamp(0.0, 255.0) as u8,
        };
        Self {
            lower: clamp(lower),
            upper: clamp(upper),
        }
    }

    /// Inclusive membership test across all three components.
    pub fn contains(&self, color: Hsv) -> bool {
        color.h >= self.lower.h
            && color.h <= self.upper.h
            && color.s >= self.lower.s
            && color.s <= self.upper.s
            && color.v >= self.lower.v
            && color.v <= self.upper.v
    }
}

/// Converts a single RGB pixel into the HSV scaling described above.
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> Hsv {
    let r = pixel[0] as f32;
    let g = pixel[1] as f32;
    let b = pixel[2] as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = max - min;

    let v = max;
    let s = if max > 0.0 { 255.0 * diff / max } else { 0.0 };

    let mut h_deg = if diff == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / diff
    } else if max == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h_deg < 0.0 {
        h_deg += 360.0;
    }

    // Half-degree hue; rounding can land exactly on 180, which wraps to 0.
    let mut h = (h_deg / 2.0).round();
    if h >= 180.0 {
        h -= 180.0;
    }

    Hsv {
        h: h as u8,
        s: s.round() as u8,
        v: v.round() as u8,
    }
}
