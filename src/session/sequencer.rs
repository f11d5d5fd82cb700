use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::assets::source::SourceImage;
use crate::assets::sprites::SpriteSet;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{ElimError, ElimResult};
use crate::render::compositor::Compositor;
use crate::render::frame::Frame;
use crate::render::overlay::OverlayStyle;
use crate::scene::model::{Preset, SceneSpec, fade_opacity};
use crate::scene::particles::{ParticleField, ParticleKind, ParticleParams};
use crate::session::config::RunConfig;

/// Images a preset draws from.
#[derive(Clone, Copy, Debug)]
pub struct SceneInputs<'a> {
    /// Photo used by hold, fade, freeze and particle scenes.
    pub primary: &'a SourceImage,
    /// All uploaded images in upload order, for frame-sequence scenes.
    pub sequence: &'a [SourceImage],
    pub sprites: &'a SpriteSet,
}

/// Progress notifications from [`render_preset`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequencerEvent {
    SceneStarted {
        index: usize,
        name: &'static str,
        frames: u32,
    },
    FrameCaptured {
        index: FrameIndex,
    },
}

/// Drive `comp` through every scene of `preset` and return the captured frames in order.
///
/// Frames are produced one at a time on the calling thread; `observe` sees each scene start and
/// each captured frame before the next drawing operation begins.
#[tracing::instrument(skip_all, fields(preset = %preset.name))]
pub fn render_preset<R: Rng + ?Sized>(
    preset: &Preset,
    comp: &mut Compositor,
    inputs: SceneInputs<'_>,
    rng: &mut R,
    mut observe: impl FnMut(SequencerEvent),
) -> ElimResult<Vec<Frame>> {
    preset.validate()?;
    if preset.uses_sequence() && inputs.sequence.is_empty() {
        return Err(ElimError::validation(
            "frame-sequence scene needs at least one uploaded frame",
        ));
    }

    let total = preset.total_frames(inputs.sequence.len());
    let mut out = Vec::with_capacity(usize::try_from(total).unwrap_or(0));

    for (index, scene) in preset.scenes.iter().enumerate() {
        let frames = scene.frame_count(inputs.sequence.len());
        let delay_ms = scene.frame_delay_ms();
        let before = out.len();
        tracing::debug!(index, scene = scene.name(), frames, delay_ms, "scene started");
        observe(SequencerEvent::SceneStarted {
            index,
            name: scene.name(),
            frames,
        });

        match scene {
            SceneSpec::Hold { .. } => {
                comp.clear();
                comp.draw_image_fit(inputs.primary)?;
                capture(comp, delay_ms, &mut out, &mut observe);
            }
            SceneSpec::FadeOverlay { frames: n, .. } => {
                for i in 1..=*n {
                    comp.clear();
                    comp.draw_image_fit(inputs.primary)?;
                    stroke(comp, &preset.overlay, fade_opacity(i, *n))?;
                    capture(comp, delay_ms, &mut out, &mut observe);
                }
            }
            SceneSpec::GrayscaleFreeze { repeats, .. } => {
                draw_frozen_background(comp, inputs.primary, &preset.overlay)?;
                for _ in 0..*repeats {
                    capture(comp, delay_ms, &mut out, &mut observe);
                }
            }
            SceneSpec::ParticleFall(params) => {
                run_particle_fall(comp, inputs, &preset.overlay, *params, rng, |comp| {
                    capture(comp, delay_ms, &mut out, &mut observe)
                })?;
            }
            SceneSpec::FrameSequence { .. } => {
                for image in inputs.sequence {
                    comp.clear();
                    comp.draw_image_fit(image)?;
                    capture(comp, delay_ms, &mut out, &mut observe);
                }
            }
        }

        tracing::debug!(index, captured = out.len() - before, "scene finished");
    }

    tracing::info!(frames = out.len(), "preset rendered");
    Ok(out)
}

/// Size the surface for `sources` and render every frame `config` asks for.
///
/// The first source is the primary image; all of them form the frame sequence.
pub fn render_config(
    sources: &[SourceImage],
    config: &RunConfig,
    observe: impl FnMut(SequencerEvent),
) -> ElimResult<(Canvas, Vec<Frame>)> {
    let preset = config.preset();
    let primary = sources
        .first()
        .ok_or_else(|| ElimError::validation("no source images"))?;
    let sprites = match &config.sprites {
        Some(paths) => SpriteSet::from_paths(&paths.bill, &paths.coin)?,
        None => SpriteSet::procedural(),
    };

    let canvas = preset.canvas.resolve(primary.width, primary.height)?;
    let mut comp = Compositor::new(canvas)?;
    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    tracing::info!(
        preset = %preset.name,
        width = canvas.width,
        height = canvas.height,
        sources = sources.len(),
        "rendering scenes"
    );

    let inputs = SceneInputs {
        primary,
        sequence: sources,
        sprites: &sprites,
    };
    let frames = render_preset(&preset, &mut comp, inputs, &mut rng, observe)?;
    Ok((canvas, frames))
}

fn capture(
    comp: &mut Compositor,
    delay_ms: u32,
    out: &mut Vec<Frame>,
    observe: &mut impl FnMut(SequencerEvent),
) {
    let index = FrameIndex(out.len() as u64);
    out.push(comp.snapshot(delay_ms));
    observe(SequencerEvent::FrameCaptured { index });
}

fn stroke(comp: &mut Compositor, overlay: &OverlayStyle, opacity: f64) -> ElimResult<()> {
    let color = overlay
        .color
        .with_opacity(opacity * f64::from(overlay.color.a) / 255.0);
    let width = overlay.line_width(comp.canvas());
    comp.stroke_overlay(overlay.path, color, width)
}

fn draw_frozen_background(
    comp: &mut Compositor,
    primary: &SourceImage,
    overlay: &OverlayStyle,
) -> ElimResult<()> {
    comp.clear();
    comp.draw_image_fit(primary)?;
    comp.apply_grayscale();
    stroke(comp, overlay, 1.0)
}

fn run_particle_fall<R: Rng + ?Sized>(
    comp: &mut Compositor,
    inputs: SceneInputs<'_>,
    overlay: &OverlayStyle,
    params: ParticleParams,
    rng: &mut R,
    mut capture: impl FnMut(&mut Compositor),
) -> ElimResult<()> {
    let mut field = ParticleField::new(params, comp.canvas());
    let size = field.size_px();
    for _ in 0..params.frames {
        draw_frozen_background(comp, inputs.primary, overlay)?;
        let report = field.step(rng);
        if report.culled > 0 {
            tracing::trace!(culled = report.culled, "particles culled");
        }
        for p in field.particles() {
            let sprite = match p.kind {
                ParticleKind::Bill => &inputs.sprites.bill,
                ParticleKind::Coin => &inputs.sprites.coin,
            };
            comp.draw_particle(sprite, p.x, p.y, p.rotation_deg, size)?;
        }
        capture(comp);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/sequencer.rs"]
mod tests;
