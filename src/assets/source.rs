use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ElimError, ElimResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// An immutable decoded raster (premultiplied RGBA8, row-major, tightly packed).
///
/// Pixel storage is shared, so cloning a `SourceImage` is cheap.
#[derive(Clone, Debug)]
pub struct SourceImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Build a source image from straight-alpha RGBA8 bytes.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> ElimResult<Self> {
        let expected = Canvas::new(width, height)
            .map_err(|_| ElimError::decode(format!("image has empty size {width}x{height}")))?
            .byte_len();
        if rgba.len() != expected {
            return Err(ElimError::decode(format!(
                "pixel buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Build a source image from bytes that are already premultiplied.
    pub(crate) fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }

    /// Dimensions as a [`Canvas`].
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}
