use std::collections::HashMap;
use std::sync::Arc;

use vello_cpu::kurbo::{Affine as CpuAffine, Cap, Join, Rect, Stroke};

use crate::assets::source::SourceImage;
use crate::foundation::core::{BezPath, Canvas, Rgba8};
use crate::foundation::error::{ElimError, ElimResult};
use crate::foundation::math::luma_u8;
use crate::render::frame::{Frame, FrameRGBA};
use crate::render::overlay::OverlayPath;

/// Opacity used for decorative particle sprites.
pub const PARTICLE_OPACITY: f32 = 0.9;

#[derive(Clone)]
struct CachedPaint {
    // Keeps the source buffer alive so its address stays a valid cache key.
    _pixels: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

/// Single reusable drawing surface, backed by `vello_cpu`.
///
/// Vector and image operations are batched in a render context and rasterised lazily; pixel
/// passes ([`Compositor::apply_grayscale`]) and [`Compositor::snapshot`] flush the batch first,
/// so operations always take effect in call order.
pub struct Compositor {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    surface: vello_cpu::Pixmap,
    drawing: bool,
    has_content: bool,
    paints: HashMap<usize, CachedPaint>,
}

impl Compositor {
    /// Acquire a transparent surface of the given size.
    pub fn new(canvas: Canvas) -> ElimResult<Self> {
        let (w, h) = surface_dims(canvas)?;
        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            surface: vello_cpu::Pixmap::new(w, h),
            drawing: false,
            has_content: false,
            paints: HashMap::new(),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Reset the surface to fully transparent.
    pub fn clear(&mut self) {
        self.ctx.reset();
        self.drawing = false;
        self.has_content = false;
        clear_pixmap_to_transparent(&mut self.surface);
    }

    /// Blit `image` stretched to the full surface bounds.
    pub fn draw_image_fit(&mut self, image: &SourceImage) -> ElimResult<()> {
        let paint = self.paint_for(image)?;
        self.begin_draw()?;

        let sx = f64::from(self.canvas.width) / f64::from(image.width);
        let sy = f64::from(self.canvas.height) / f64::from(image.height);
        self.ctx.set_transform(CpuAffine::scale_non_uniform(sx, sy));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        Ok(())
    }

    /// Replace every pixel's RGB with its luma; alpha is untouched.
    pub fn apply_grayscale(&mut self) {
        self.commit();
        grayscale_rgba8_in_place(self.surface.data_as_u8_slice_mut());
    }

    /// Stroke an overlay path with round caps and joins.
    ///
    /// `color` is straight alpha; a fade is expressed through its alpha channel.
    pub fn stroke_overlay(
        &mut self,
        path: OverlayPath,
        color: Rgba8,
        line_width: f64,
    ) -> ElimResult<()> {
        if line_width <= 0.0 || !line_width.is_finite() {
            return Err(ElimError::validation(
                "overlay line width must be finite and > 0",
            ));
        }
        if color.a == 0 {
            return Ok(());
        }
        self.begin_draw()?;

        let cpu_path = bezpath_to_cpu(&path.to_bezpath(self.canvas));
        self.ctx.set_transform(CpuAffine::IDENTITY);
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.set_stroke(
            Stroke::new(line_width)
                .with_caps(Cap::Round)
                .with_join(Join::Round),
        );
        self.ctx.stroke_path(&cpu_path);
        Ok(())
    }

    /// Draw `sprite` centred at `(x, y)`, rotated, with its larger side scaled to `size`.
    pub fn draw_particle(
        &mut self,
        sprite: &SourceImage,
        x: f64,
        y: f64,
        rotation_deg: f64,
        size: f64,
    ) -> ElimResult<()> {
        let paint = self.paint_for(sprite)?;
        self.begin_draw()?;

        let sw = f64::from(sprite.width);
        let sh = f64::from(sprite.height);
        let scale = size / sw.max(sh);
        let tr = CpuAffine::translate((x, y))
            * CpuAffine::rotate(rotation_deg.to_radians())
            * CpuAffine::scale(scale)
            * CpuAffine::translate((-sw / 2.0, -sh / 2.0));

        self.ctx.set_transform(tr);
        self.ctx.set_paint(paint);
        self.ctx.push_opacity_layer(PARTICLE_OPACITY);
        self.ctx.fill_rect(&Rect::new(0.0, 0.0, sw, sh));
        self.ctx.pop_layer();
        Ok(())
    }

    /// Capture the current surface as an owned frame.
    pub fn snapshot(&mut self, delay_ms: u32) -> Frame {
        self.commit();
        Frame {
            image: FrameRGBA {
                width: self.canvas.width,
                height: self.canvas.height,
                data: self.surface.data_as_u8_slice().to_vec(),
                premultiplied: true,
            },
            delay_ms,
        }
    }

    /// Premultiplied RGBA8 view of the surface, with pending drawing flushed.
    pub fn pixels(&mut self) -> &[u8] {
        self.commit();
        self.surface.data_as_u8_slice()
    }

    fn begin_draw(&mut self) -> ElimResult<()> {
        if self.drawing {
            return Ok(());
        }
        self.ctx.reset();
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx.set_paint_transform(CpuAffine::IDENTITY);

        // The context renders a fresh scene, so existing pixels are re-laid as the bottom layer.
        if self.has_content {
            let base = image_from_premul_bytes(
                self.surface.data_as_u8_slice(),
                self.canvas.width,
                self.canvas.height,
            )?;
            self.ctx.set_transform(CpuAffine::IDENTITY);
            self.ctx.set_paint(base);
            self.ctx.fill_rect(&Rect::new(
                0.0,
                0.0,
                f64::from(self.canvas.width),
                f64::from(self.canvas.height),
            ));
        }
        self.drawing = true;
        Ok(())
    }

    fn commit(&mut self) {
        if !self.drawing {
            return;
        }
        self.ctx.flush();
        clear_pixmap_to_transparent(&mut self.surface);
        self.ctx.render_to_pixmap(&mut self.surface);
        self.drawing = false;
        self.has_content = true;
    }

    fn paint_for(&mut self, image: &SourceImage) -> ElimResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&image.rgba8_premul) as usize;
        if let Some(cached) = self.paints.get(&key) {
            return Ok(cached.paint.clone());
        }
        let paint = image_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        self.paints.insert(
            key,
            CachedPaint {
                _pixels: image.rgba8_premul.clone(),
                paint: paint.clone(),
            },
        );
        Ok(paint)
    }
}

/// Rec. 601 grayscale over an RGBA8 buffer; alpha is untouched.
///
/// Gray pixels map to themselves, so applying the pass twice equals applying it once.
pub fn grayscale_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let y = luma_u8(px[0], px[1], px[2]);
        px[0] = y;
        px[1] = y;
        px[2] = y;
    }
}

fn surface_dims(canvas: Canvas) -> ElimResult<(u16, u16)> {
    let w: u16 = canvas.width.try_into().map_err(|_| {
        ElimError::canvas(format!("surface width {} exceeds u16", canvas.width))
    })?;
    let h: u16 = canvas.height.try_into().map_err(|_| {
        ElimError::canvas(format!("surface height {} exceeds u16", canvas.height))
    })?;
    if w == 0 || h == 0 {
        return Err(ElimError::canvas(format!(
            "surface must be non-empty, got {w}x{h}"
        )));
    }
    Ok((w, h))
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ElimResult<vello_cpu::Pixmap> {
    let (w, h) = surface_dims(Canvas { width, height })?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ElimError::canvas("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn image_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> ElimResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
