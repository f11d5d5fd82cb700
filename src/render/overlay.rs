use kurbo::{BezPath, Point};

use crate::foundation::core::{Canvas, Rgba8};

/// Vector overlay shapes stroked over the photo.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayPath {
    /// Centred X whose arms span `min(width, height) * scale`.
    CenteredCross {
        /// Fraction of the shorter side covered by the cross.
        scale: f64,
    },
    /// X from corner to corner of the full surface.
    DiagonalCross,
}

impl OverlayPath {
    /// Build the path in surface pixel coordinates.
    pub fn to_bezpath(self, canvas: Canvas) -> BezPath {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let (x0, y0, x1, y1) = match self {
            Self::CenteredCross { scale } => {
                let half = f64::from(canvas.min_side()) * scale / 2.0;
                let (cx, cy) = (w / 2.0, h / 2.0);
                (cx - half, cy - half, cx + half, cy + half)
            }
            Self::DiagonalCross => (0.0, 0.0, w, h),
        };

        let mut p = BezPath::new();
        p.move_to(Point::new(x0, y0));
        p.line_to(Point::new(x1, y1));
        p.move_to(Point::new(x1, y0));
        p.line_to(Point::new(x0, y1));
        p
    }
}

/// Colour, shape and stroke width of a scene overlay.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayStyle {
    pub path: OverlayPath,
    /// Full-opacity stroke colour; fades scale its alpha.
    pub color: Rgba8,
    /// Stroke width as a fraction of `min(width, height)`.
    pub width_fraction: f64,
    /// Lower bound for the stroke width in pixels.
    pub min_width_px: f64,
}

impl OverlayStyle {
    /// Red centred cross used by the elimination animations.
    pub fn red_cross() -> Self {
        Self {
            path: OverlayPath::CenteredCross { scale: 0.7 },
            color: Rgba8::opaque(255, 0, 0),
            width_fraction: 1.0 / 120.0,
            min_width_px: 6.0,
        }
    }

    /// Stroke width in pixels for a surface.
    pub fn line_width(&self, canvas: Canvas) -> f64 {
        (f64::from(canvas.min_side()) * self.width_fraction).max(self.min_width_px)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
