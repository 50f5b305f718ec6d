//! Rectangle types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// A normalized rectangle (0.0 to 1.0) representing a relative region of a frame.
///
/// Used for caller-supplied overlay zones (§3 `OverlayZone`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    /// X coordinate of the top-left corner (0.0 = left, 1.0 = right)
    pub x: f64,
    /// Y coordinate of the top-left corner (0.0 = top, 1.0 = bottom)
    pub y: f64,
    /// Width of the rectangle (0.0 to 1.0)
    pub width: f64,
    /// Height of the rectangle (0.0 to 1.0)
    pub height: f64,
}

impl NormalizedRect {
    /// Create a new normalized rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if the rectangle is within 0.0-1.0 range.
    pub fn is_valid(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.x + self.width <= 1.001
            && self.y + self.height <= 1.001
    }

    /// Convert to pixel coordinates for a frame of the given size, clamped to bounds.
    pub fn to_pixels(&self, frame_width: u32, frame_height: u32) -> PixelRect {
        let fw = frame_width as f64;
        let fh = frame_height as f64;

        let x = (self.x * fw).round().clamp(0.0, fw);
        let y = (self.y * fh).round().clamp(0.0, fh);
        let w = (self.width * fw).round().min(fw - x).max(0.0);
        let h = (self.height * fh).round().min(fh - y).max(0.0);

        PixelRect {
            x: x as i32,
            y: y as i32,
            width: w as i32,
            height: h as i32,
        }
    }
}

/// A rectangle in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Bounding box in floating-point pixel coordinates, used for detected faces.
///
/// Mirrors the arithmetic of a classifier's native output before it is
/// rounded for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn cx(&self) -> f64 {
        self.x + self.width / 2.0
    }

    #[inline]
    pub fn cy(&self) -> f64 {
        self.y + self.height / 2.0
    }

    #[inline]
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection-over-union with another box.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Expand the box by `pixels` on every side, clamped to `(width, height)`.
    pub fn expand_clamped(&self, pixels: f64, frame_width: u32, frame_height: u32) -> BoundingBox {
        let fw = frame_width as f64;
        let fh = frame_height as f64;

        let x = (self.x - pixels).max(0.0);
        let y = (self.y - pixels).max(0.0);
        let x2 = (self.x2() + pixels).min(fw);
        let y2 = (self.y2() + pixels).min(fh);

        BoundingBox {
            x,
            y,
            width: (x2 - x).max(0.0),
            height: (y2 - y).max(0.0),
        }
    }
}

/// A suggested 16:9 crop window, in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedCrop {
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
    #[serde(rename = "Width")]
    pub width: i32,
    #[serde(rename = "Height")]
    pub height: i32,
}

impl SuggestedCrop {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

const SIXTEEN_NINE: f64 = 16.0 / 9.0;

/// Compute the largest centered 16:9 crop that fits inside a `width x height`
/// frame (§4.10). Pure geometry, no decoding involved.
pub fn suggested_crop(width: u32, height: u32) -> SuggestedCrop {
    let w = width as f64;
    let h = height as f64;

    if h <= 0.0 || w <= 0.0 {
        return SuggestedCrop {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        };
    }

    if (w / h - SIXTEEN_NINE).abs() < 0.01 {
        return SuggestedCrop {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        };
    }

    let mut target_h = w * 9.0 / 16.0;
    let mut target_w = w;
    if target_h > h {
        target_w = h * 16.0 / 9.0;
        target_h = h;
    }

    // Truncate, not round: S6's 1000x1080 case must yield height 562
    // (1000*9/16 = 562.5), not 563.
    let target_w = target_w as i32;
    let target_h = target_h as i32;
    let x = ((width as i32 - target_w) / 2).max(0);
    let y = ((height as i32 - target_h) / 2).max(0);

    SuggestedCrop {
        x,
        y,
        width: target_w,
        height: target_h,
    }
}
