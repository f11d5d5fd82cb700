use crate::assets::source::SourceImage;
use crate::foundation::error::{ElimError, ElimResult};

/// Decode encoded image bytes and convert to premultiplied RGBA8.
///
/// Any format enabled in the `image` crate is accepted (PNG, JPEG, GIF, WebP, BMP, ...). For
/// animated inputs only the first frame is used.
pub fn decode_image(bytes: &[u8]) -> ElimResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ElimError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    SourceImage::from_straight_rgba8(width, height, rgba.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
