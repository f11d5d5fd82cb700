use crate::foundation::error::{ElimError, ElimResult};

pub use kurbo::{Affine, BezPath, Point, Vec2};

/// Zero-based position of a frame in the generated sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Pixel dimensions of a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> ElimResult<Self> {
        if width == 0 || height == 0 {
            return Err(ElimError::canvas(format!(
                "surface must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Scale `width x height` so the larger side is at most `max_dim`, keeping the aspect ratio.
    ///
    /// The scaled side is truncated. Sizes already within the limit are returned unchanged;
    /// neither side drops below 1px.
    pub fn fit_within(width: u32, height: u32, max_dim: u32) -> ElimResult<Self> {
        if max_dim == 0 {
            return Err(ElimError::validation("max dimension must be > 0"));
        }
        if width <= max_dim && height <= max_dim {
            return Self::new(width, height);
        }

        let scaled = |minor: u32, major: u32| -> u32 {
            let v = (f64::from(minor) * f64::from(max_dim) / f64::from(major)).floor();
            (v as u32).max(1)
        };
        if width > height {
            Self::new(max_dim, scaled(height, width))
        } else {
            Self::new(scaled(width, height), max_dim)
        }
    }

    pub fn min_side(self) -> u32 {
        self.width.min(self.height)
    }

    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Straight (non-premultiplied) RGBA8 colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same colour with alpha set from a `0.0..=1.0` opacity.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
