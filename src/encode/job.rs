use std::sync::mpsc;
use std::thread::JoinHandle;

use crate::encode::sink::{EncodeConfig, FrameSink};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ElimError, ElimResult};
use crate::render::frame::Frame;

/// Message emitted by a running [`EncodeJob`].
///
/// A job emits any number of `Progress` events followed by exactly one terminal event.
#[derive(Clone, Debug, PartialEq)]
pub enum EncodeEvent {
    /// Fraction of the job done, `0.0..=1.0`.
    ///
    /// Each handed-off frame counts as one step and [`FrameSink::end`] as the last one, so
    /// `1.0` is only sent once the sink has produced its bytes.
    Progress(f32),
    Finished(Vec<u8>),
    Failed(String),
}

impl EncodeEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Frame encoding running on a worker thread.
pub struct EncodeJob<S> {
    events: mpsc::Receiver<EncodeEvent>,
    handle: JoinHandle<S>,
}

impl<S> EncodeJob<S>
where
    S: FrameSink + Send + 'static,
{
    /// Start encoding `frames` in order; the sink is handed back by [`EncodeJob::join`].
    pub fn spawn(mut sink: S, cfg: EncodeConfig, frames: Vec<Frame>) -> ElimResult<Self> {
        let (tx, rx) = mpsc::channel::<EncodeEvent>();
        let handle = std::thread::Builder::new()
            .name("elimgif-encode".to_string())
            .spawn(move || {
                let terminal = match encode_all(&mut sink, cfg, &frames, &tx) {
                    Ok(bytes) => EncodeEvent::Finished(bytes),
                    Err(e) => EncodeEvent::Failed(e.to_string()),
                };
                // The receiver may be gone if the caller dropped the job.
                let _ = tx.send(terminal);
                sink
            })
            .map_err(|e| ElimError::encoding(format!("failed to start encoder thread: {e}")))?;
        Ok(Self { events: rx, handle })
    }

    /// Block until the job ends, forwarding progress; returns the GIF bytes.
    pub fn wait(self, on_progress: impl FnMut(f32)) -> ElimResult<Vec<u8>> {
        self.join(on_progress).0
    }

    /// Like [`EncodeJob::wait`], but also returns the sink (`None` if the worker panicked).
    pub fn join(self, mut on_progress: impl FnMut(f32)) -> (ElimResult<Vec<u8>>, Option<S>) {
        let mut outcome = None;
        for event in self.events.iter() {
            match event {
                EncodeEvent::Progress(p) => on_progress(p),
                EncodeEvent::Finished(bytes) => {
                    outcome = Some(Ok(bytes));
                    break;
                }
                EncodeEvent::Failed(msg) => {
                    outcome = Some(Err(ElimError::encoding(msg)));
                    break;
                }
            }
        }

        let sink = self.handle.join().ok();
        let result = outcome.unwrap_or_else(|| {
            Err(ElimError::encoding(
                "encoder thread exited without a result",
            ))
        });
        (result, sink)
    }
}

fn encode_all(
    sink: &mut dyn FrameSink,
    cfg: EncodeConfig,
    frames: &[Frame],
    tx: &mpsc::Sender<EncodeEvent>,
) -> ElimResult<Vec<u8>> {
    sink.begin(cfg)?;
    let steps = (frames.len() + 1) as f32;
    for (i, frame) in frames.iter().enumerate() {
        sink.push_frame(FrameIndex(i as u64), frame)?;
        let _ = tx.send(EncodeEvent::Progress((i + 1) as f32 / steps));
    }
    let bytes = sink.end()?;
    let _ = tx.send(EncodeEvent::Progress(1.0));
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/job.rs"]
mod tests;
