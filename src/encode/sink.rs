use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ElimError, ElimResult};
use crate::render::frame::Frame;

/// Worst (fastest) quantiser setting accepted by [`EncodeConfig::quality`].
pub const MAX_QUALITY: u8 = 30;

/// Parameters handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    /// `1..=30`, lower is better and slower.
    pub quality: u8,
    /// Number of repeats; `0` loops forever.
    pub loop_count: u16,
}

impl EncodeConfig {
    pub fn validate(&self) -> ElimResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ElimError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(ElimError::validation(format!(
                "encode size {}x{} exceeds the GIF limit of 65535",
                self.width, self.height
            )));
        }
        if !(1..=MAX_QUALITY).contains(&self.quality) {
            return Err(ElimError::validation(format!(
                "encode quality must be within 1..={MAX_QUALITY}, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called with `FrameIndex(0), FrameIndex(1), ..` in
/// generation order, between one `begin` and one `end`.
pub trait FrameSink {
    fn begin(&mut self, cfg: EncodeConfig) -> ElimResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ElimResult<()>;
    /// Finish the stream and hand back the encoded bytes.
    fn end(&mut self) -> ElimResult<Vec<u8>>;
}

/// In-memory sink for tests and debugging. `end` yields no bytes.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<EncodeConfig>,
    /// Frames in the order they were pushed.
    pub frames: Vec<(FrameIndex, Frame)>,
    /// Set once `end` has been called.
    pub ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<EncodeConfig> {
        self.cfg
    }

    /// Delays of all pushed frames, in order.
    pub fn delays(&self) -> Vec<u32> {
        self.frames.iter().map(|(_, f)| f.delay_ms).collect()
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: EncodeConfig) -> ElimResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ElimResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ElimResult<Vec<u8>> {
        self.ended = true;
        Ok(Vec::new())
    }
}
