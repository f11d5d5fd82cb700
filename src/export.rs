//! Delivery of finished GIFs and debug frames.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ElimError, ElimResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::frame::Frame;

/// File name used when the caller does not pick one.
pub const DEFAULT_FILE_NAME: &str = "elimination-animated.gif";

/// Where a GIF ended up.
#[derive(Debug)]
pub struct Delivery {
    pub path: PathBuf,
    pub bytes: usize,
    /// Whether a native share target accepted the file.
    pub shared: bool,
    /// Non-fatal notice raised while sharing.
    pub notice: Option<ElimError>,
}

pub fn ensure_parent_dir(path: &Path) -> ElimResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Write GIF bytes to `path`, creating parent directories.
pub fn write_gif(path: &Path, bytes: &[u8]) -> ElimResult<()> {
    if bytes.is_empty() {
        return Err(ElimError::validation("refusing to write an empty GIF"));
    }
    ensure_parent_dir(path)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

/// Hand the GIF to a native share target.
///
/// A terminal has none, so this always reports [`ElimError::SharingUnsupported`].
pub fn share(_bytes: &[u8]) -> ElimResult<()> {
    Err(ElimError::SharingUnsupported)
}

/// Save the GIF and optionally try to share it, falling back to the saved file.
pub fn deliver(bytes: &[u8], out: &Path, try_share: bool) -> ElimResult<Delivery> {
    write_gif(out, bytes)?;
    tracing::info!(path = %out.display(), bytes = bytes.len(), "gif written");

    let mut delivery = Delivery {
        path: out.to_path_buf(),
        bytes: bytes.len(),
        shared: false,
        notice: None,
    };
    if try_share {
        match share(bytes) {
            Ok(()) => delivery.shared = true,
            Err(e) if !e.is_fatal() => {
                tracing::warn!(error = %e, path = %out.display(), "sharing unavailable, file kept");
                delivery.notice = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(delivery)
}

/// Straight-alpha copy of a frame, for PNG export.
pub fn frame_to_rgba_image(frame: &Frame) -> ElimResult<image::RgbaImage> {
    let mut data = frame.image.data.clone();
    if frame.image.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    image::RgbaImage::from_raw(frame.width(), frame.height(), data)
        .ok_or_else(|| ElimError::validation("frame buffer does not match its size"))
}

pub fn write_frame_png(path: &Path, frame: &Frame) -> ElimResult<()> {
    let img = frame_to_rgba_image(frame)?;
    ensure_parent_dir(path)?;
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/export.rs"]
mod tests;
