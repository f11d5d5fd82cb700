use image::codecs::gif::{GifEncoder, Repeat};

use crate::encode::sink::{EncodeConfig, FrameSink};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ElimError, ElimResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::Frame;

/// Animated GIF sink backed by the `image` crate's GIF codec.
///
/// Frames are flattened to opaque RGBA as they arrive and quantised when the stream ends.
pub struct GifSink {
    background: [u8; 3],
    cfg: Option<EncodeConfig>,
    frames: Vec<image::Frame>,
}

impl Default for GifSink {
    fn default() -> Self {
        Self::new()
    }
}

impl GifSink {
    /// Sink that flattens transparent pixels over white.
    pub fn new() -> Self {
        Self::with_background([255, 255, 255])
    }

    pub fn with_background(rgb: [u8; 3]) -> Self {
        Self {
            background: rgb,
            cfg: None,
            frames: Vec::new(),
        }
    }

    fn next_index(&self) -> u64 {
        self.frames.len() as u64
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: EncodeConfig) -> ElimResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ElimResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| ElimError::encoding("push_frame called before begin"))?;
        if idx.0 != self.next_index() {
            return Err(ElimError::encoding(format!(
                "frame {} pushed out of order (expected {})",
                idx.0,
                self.next_index()
            )));
        }
        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(ElimError::encoding(format!(
                "frame {} is {}x{}, stream is {}x{}",
                idx.0,
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        let mut rgba = vec![0u8; frame.image.data.len()];
        flatten_to_opaque_rgba8(
            &mut rgba,
            &frame.image.data,
            frame.image.premultiplied,
            self.background,
        )?;
        let buf = image::RgbaImage::from_raw(cfg.width, cfg.height, rgba)
            .ok_or_else(|| ElimError::encoding(format!("frame {} has a short buffer", idx.0)))?;
        let delay = image::Delay::from_numer_denom_ms(frame.delay_ms, 1);
        self.frames.push(image::Frame::from_parts(buf, 0, 0, delay));
        Ok(())
    }

    fn end(&mut self) -> ElimResult<Vec<u8>> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| ElimError::encoding("end called before begin"))?;
        if self.frames.is_empty() {
            return Err(ElimError::encoding("no frames to encode"));
        }

        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut out, i32::from(cfg.quality));
            let repeat = match cfg.loop_count {
                0 => Repeat::Infinite,
                n => Repeat::Finite(n),
            };
            encoder
                .set_repeat(repeat)
                .map_err(|e| ElimError::encoding(format!("set repeat: {e}")))?;
            encoder
                .encode_frames(std::mem::take(&mut self.frames))
                .map_err(|e| ElimError::encoding(format!("gif encode: {e}")))?;
        }
        tracing::debug!(bytes = out.len(), "gif stream finished");
        Ok(out)
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg: [u8; 3],
) -> ElimResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ElimError::encoding(
            "flatten expects equal-length rgba8 buffers",
        ));
    }
    let [bg_r, bg_g, bg_b] = bg.map(u16::from);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        let over = |c: u8, bg: u16| -> u8 {
            let c = u16::from(c);
            let fg = if src_is_premul {
                c
            } else {
                mul_div255_u16(c, a)
            };
            (fg + mul_div255_u16(bg, inv)).min(255) as u8
        };
        d[0] = over(s[0], bg_r);
        d[1] = over(s[1], bg_g);
        d[2] = over(s[2], bg_b);
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
