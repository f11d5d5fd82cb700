use std::path::Path;

use vello_cpu::kurbo::{Circle, Rect, Shape as _, Stroke};
use vello_cpu::peniko::Color;

use crate::assets::intake::SourceFile;
use crate::assets::loader::load_sources;
use crate::assets::source::SourceImage;
use crate::foundation::error::{ElimError, ElimResult};

const BILL_W: u16 = 96;
const BILL_H: u16 = 48;
const COIN_D: u16 = 48;

/// Decorative particle sprites.
#[derive(Clone, Debug)]
pub struct SpriteSet {
    /// Banknote sprite.
    pub bill: SourceImage,
    /// Coin sprite.
    pub coin: SourceImage,
}

impl SpriteSet {
    /// Built-in sprites, rasterised on the CPU (no bundled image files).
    pub fn procedural() -> Self {
        Self {
            bill: render_bill(),
            coin: render_coin(),
        }
    }

    /// Load user-supplied sprite images through the regular loader.
    pub fn from_paths(bill: &Path, coin: &Path) -> ElimResult<Self> {
        let files = [SourceFile::from_path(bill)?, SourceFile::from_path(coin)?];
        let mut images = load_sources(&files)?.into_iter();
        match (images.next(), images.next()) {
            (Some(bill), Some(coin)) => Ok(Self { bill, coin }),
            _ => Err(ElimError::decode("sprite load returned too few images")),
        }
    }
}

fn render_sprite(
    width: u16,
    height: u16,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) -> SourceImage {
    let mut ctx = vello_cpu::RenderContext::new(width, height);
    draw(&mut ctx);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    ctx.render_to_pixmap(&mut pixmap);
    SourceImage::from_premul_rgba8(
        u32::from(width),
        u32::from(height),
        pixmap.data_as_u8_slice().to_vec(),
    )
}

fn render_bill() -> SourceImage {
    let (w, h) = (f64::from(BILL_W), f64::from(BILL_H));
    render_sprite(BILL_W, BILL_H, |ctx| {
        ctx.set_paint(Color::from_rgba8(76, 153, 76, 255));
        ctx.fill_rect(&Rect::new(0.0, 0.0, w, h));

        ctx.set_paint(Color::from_rgba8(34, 96, 34, 255));
        ctx.set_stroke(Stroke::new(3.0));
        ctx.stroke_path(&Rect::new(5.0, 5.0, w - 5.0, h - 5.0).to_path(0.1));

        ctx.set_paint(Color::from_rgba8(200, 230, 200, 255));
        ctx.fill_path(&Circle::new((w / 2.0, h / 2.0), h * 0.28).to_path(0.1));
    })
}

fn render_coin() -> SourceImage {
    let r = f64::from(COIN_D) / 2.0;
    render_sprite(COIN_D, COIN_D, |ctx| {
        ctx.set_paint(Color::from_rgba8(212, 175, 55, 255));
        ctx.fill_path(&Circle::new((r, r), r - 1.0).to_path(0.1));

        ctx.set_paint(Color::from_rgba8(150, 115, 20, 255));
        ctx.set_stroke(Stroke::new(3.0));
        ctx.stroke_path(&Circle::new((r, r), r * 0.7).to_path(0.1));
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sprites.rs"]
mod tests;
