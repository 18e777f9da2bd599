use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in normalized image coordinates.
///
/// All four fields are expected to lie in `[0, 1]` with `x + width <= 1`
/// and `y + height <= 1`; producers clamp before emitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection over union with `other`.
    ///
    /// Returns 0 when either box has no area. A small epsilon keeps the
    /// division defined for boxes that barely touch.
    pub fn iou(&self, other: &Rect) -> f32 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);

        let area_a = self.area();
        let area_b = other.area();
        if area_a <= 0.0 || area_b <= 0.0 {
            return 0.0;
        }

        intersection / (area_a + area_b - intersection + 1e-6)
    }
}
