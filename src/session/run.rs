use std::sync::mpsc;

use crate::assets::intake::{SourceFile, accept_batch};
use crate::assets::loader::load_sources;
use crate::encode::job::EncodeJob;
use crate::encode::sink::{EncodeConfig, FrameSink};
use crate::foundation::error::{ElimError, ElimResult};
use crate::session::config::RunConfig;
use crate::session::sequencer::{SequencerEvent, render_config};

const LOADED_PCT: f32 = 10.0;
const RENDERED_PCT: f32 = 85.0;

/// Phase of a [`GenerationRun`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", content = "scene", rename_all = "snake_case")]
pub enum RunState {
    Idle,
    LoadingSources,
    /// Index into the preset's scene list.
    RunningScene(usize),
    Encoding,
    Complete,
    Failed,
}

impl RunState {
    /// `Complete` and `Failed` end a run; only [`GenerationRun::reset`] leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    fn allows(self, next: RunState, scene_count: usize) -> bool {
        match (self, next) {
            (Self::Idle, Self::LoadingSources) => true,
            (Self::LoadingSources, Self::RunningScene(0)) => scene_count > 0,
            (Self::RunningScene(i), Self::RunningScene(j)) => j == i + 1 && j < scene_count,
            (Self::RunningScene(i), Self::Encoding) => i + 1 == scene_count,
            (Self::Encoding, Self::Complete) => true,
            (Self::LoadingSources | Self::RunningScene(_) | Self::Encoding, Self::Failed) => true,
            _ => false,
        }
    }
}

/// Notifications published by a run with an attached channel.
#[derive(Clone, Debug, PartialEq)]
pub enum RunEvent {
    State(RunState),
    /// Overall progress in percent.
    Progress(f32),
    /// Rejected upload or other non-fatal notice.
    Notice(String),
    Completed {
        frames: usize,
        bytes: usize,
    },
    /// Sent once when the run fails.
    Failed(String),
}

/// One invocation of the pipeline: load, render every scene, encode.
///
/// A run moves `Idle -> LoadingSources -> RunningScene(0..n) -> Encoding -> Complete`, or to
/// `Failed` from any non-idle state. GIF bytes are only available once `Complete`.
#[derive(Debug)]
pub struct GenerationRun {
    state: RunState,
    progress: f32,
    scene_count: usize,
    frame_count: usize,
    bytes: Option<Vec<u8>>,
    failure: Option<String>,
    events: Option<mpsc::Sender<RunEvent>>,
}

impl Default for GenerationRun {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationRun {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            progress: 0.0,
            scene_count: 0,
            frame_count: 0,
            bytes: None,
            failure: None,
            events: None,
        }
    }

    /// Publish state, progress and completion events to `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<RunEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Overall progress, `0.0..=100.0`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Frames handed to the encoder.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Encoded GIF, present only in [`RunState::Complete`].
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        self.bytes
    }

    /// Message of the error that ended the run.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// `Idle -> LoadingSources`.
    pub fn start(&mut self) -> ElimResult<()> {
        self.transition(RunState::LoadingSources)
    }

    /// Discard everything and return to `Idle`, keeping the event channel.
    pub fn reset(&mut self) {
        let events = self.events.take();
        *self = Self::new();
        self.events = events;
        self.emit(RunEvent::State(RunState::Idle));
    }

    /// Keep the image files of an upload batch.
    ///
    /// Every rejected file is published as one [`RunEvent::Notice`]; the batch is never aborted.
    pub fn accept(&self, files: Vec<SourceFile>) -> Vec<SourceFile> {
        let batch = accept_batch(files);
        for err in &batch.rejected {
            self.emit(RunEvent::Notice(err.to_string()));
        }
        batch.accepted
    }

    /// Run the whole pipeline into `sink`.
    ///
    /// Any fatal error moves the run to `Failed`, publishes one [`RunEvent::Failed`] and is
    /// returned; no bytes are kept. On success the sink is handed back.
    pub fn execute<S>(&mut self, files: &[SourceFile], config: &RunConfig, sink: S) -> ElimResult<S>
    where
        S: FrameSink + Send + 'static,
    {
        self.start()?;
        match self.drive(files, config, sink) {
            Ok((bytes, sink)) => {
                self.transition(RunState::Complete)?;
                self.set_progress(100.0);
                tracing::info!(frames = self.frame_count, bytes = bytes.len(), "run complete");
                self.emit(RunEvent::Completed {
                    frames: self.frame_count,
                    bytes: bytes.len(),
                });
                self.bytes = Some(bytes);
                Ok(sink)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    fn drive<S>(
        &mut self,
        files: &[SourceFile],
        config: &RunConfig,
        sink: S,
    ) -> ElimResult<(Vec<u8>, S)>
    where
        S: FrameSink + Send + 'static,
    {
        config.validate()?;
        let preset = config.preset();
        preset.validate()?;
        self.scene_count = preset.scenes.len();

        let sources = load_sources(files)?;
        self.set_progress(LOADED_PCT);

        let total = preset.total_frames(sources.len()).max(1) as f32;
        let mut step_err = None;
        let (canvas, frames) = render_config(&sources, config, |event| match event {
            SequencerEvent::SceneStarted { index, .. } => {
                if let Err(e) = self.transition(RunState::RunningScene(index)) {
                    step_err.get_or_insert(e);
                }
            }
            SequencerEvent::FrameCaptured { index } => {
                let done = (index.0 + 1) as f32 / total;
                self.set_progress(LOADED_PCT + (RENDERED_PCT - LOADED_PCT) * done);
            }
        })?;
        if let Some(e) = step_err {
            return Err(e);
        }

        self.transition(RunState::Encoding)?;
        self.frame_count = frames.len();
        let enc_cfg = EncodeConfig {
            width: canvas.width,
            height: canvas.height,
            quality: config.quality,
            loop_count: config.loop_count,
        };
        let job = EncodeJob::spawn(sink, enc_cfg, frames)?;
        let (result, sink) = job.join(|p| {
            self.set_progress(RENDERED_PCT + (100.0 - RENDERED_PCT) * p.clamp(0.0, 1.0));
        });
        let bytes = result?;
        let sink = sink.ok_or_else(|| ElimError::encoding("encoder thread panicked"))?;
        Ok((bytes, sink))
    }

    fn transition(&mut self, next: RunState) -> ElimResult<()> {
        if !self.state.allows(next, self.scene_count) {
            return Err(ElimError::validation(format!(
                "illegal run transition {:?} -> {next:?}",
                self.state
            )));
        }
        tracing::debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
        self.emit(RunEvent::State(next));
        Ok(())
    }

    fn fail(&mut self, err: &ElimError) {
        if self.state.is_terminal() || self.state == RunState::Idle {
            return;
        }
        tracing::error!(error = %err, state = ?self.state, "run failed");
        self.state = RunState::Failed;
        self.bytes = None;
        self.failure = Some(err.to_string());
        self.emit(RunEvent::State(RunState::Failed));
        self.emit(RunEvent::Failed(err.to_string()));
    }

    fn set_progress(&mut self, pct: f32) {
        let pct = pct.clamp(0.0, 100.0);
        if pct > self.progress {
            self.progress = pct;
            self.emit(RunEvent::Progress(pct));
        }
    }

    fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/run.rs"]
mod tests;
