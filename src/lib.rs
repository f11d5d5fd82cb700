//! elimgif turns a photo (or an ordered set of frames) into a novelty animated GIF.
//!
//! # Pipeline overview
//!
//! 1. **Intake**: user files are checked for an `image/*` media type; other files are rejected
//!    one by one without aborting the batch ([`accept_batch`]).
//! 2. **Load**: every accepted file is decoded to premultiplied RGBA8 ([`load_sources`]).
//! 3. **Sequence**: a [`Preset`] (ordered [`SceneSpec`] list) drives one reusable
//!    [`Compositor`] surface, capturing an owned [`Frame`] per step ([`render_preset`]).
//! 4. **Encode**: frames are streamed in order into a [`FrameSink`] on a worker thread
//!    ([`EncodeJob`]); [`GifSink`] produces the final GIF bytes.
//!
//! [`GenerationRun`] ties these steps into one state machine with progress reporting.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-seed**: particle randomness is injected, so a seed fixes every frame.
//! - **Premultiplied RGBA8** between compositor and sink; sinks flatten as needed.
#![forbid(unsafe_code)]

pub mod assets;
pub mod encode;
pub mod export;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod session;

pub use assets::decode::decode_image;
pub use assets::intake::{BatchOutcome, SourceFile, accept_batch, sniff_media_type};
pub use assets::loader::load_sources;
pub use assets::source::SourceImage;
pub use assets::sprites::SpriteSet;
pub use encode::gif::GifSink;
pub use encode::job::{EncodeEvent, EncodeJob};
pub use encode::sink::{EncodeConfig, FrameSink, InMemorySink};
pub use export::{DEFAULT_FILE_NAME, Delivery, deliver, write_frame_png, write_gif};
pub use foundation::core::{Canvas, FrameIndex, Rgba8};
pub use foundation::error::{ElimError, ElimResult};
pub use render::compositor::{Compositor, grayscale_rgba8_in_place};
pub use render::frame::{Frame, FrameRGBA};
pub use render::overlay::{OverlayPath, OverlayStyle};
pub use scene::model::{CanvasPolicy, PlannedScene, Preset, SceneSpec, fade_opacity};
pub use scene::particles::{Particle, ParticleField, ParticleKind, ParticleParams};
pub use scene::presets::PresetKind;
pub use session::config::{RunConfig, SpritePaths};
pub use session::run::{GenerationRun, RunEvent, RunState};
pub use session::sequencer::{SceneInputs, SequencerEvent, render_config, render_preset};
