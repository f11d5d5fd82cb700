use super::*;
use crate::encode::sink::InMemorySink;
use crate::render::frame::FrameRGBA;

fn cfg() -> EncodeConfig {
    EncodeConfig {
        width: 1,
        height: 1,
        quality: 10,
        loop_count: 0,
    }
}

fn frames(n: u32) -> Vec<Frame> {
    (0..n)
        .map(|i| Frame {
            image: FrameRGBA {
                width: 1,
                height: 1,
                data: vec![i as u8, 0, 0, 255],
                premultiplied: true,
            },
            delay_ms: 10 + i,
        })
        .collect()
}

struct FailingSink {
    fail_at: u64,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: EncodeConfig) -> ElimResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &Frame) -> ElimResult<()> {
        if idx.0 == self.fail_at {
            return Err(ElimError::encoding("quantiser blew up"));
        }
        Ok(())
    }

    fn end(&mut self) -> ElimResult<Vec<u8>> {
        Ok(vec![1, 2, 3])
    }
}

#[test]
fn emits_progress_then_one_terminal_event() {
    let job = EncodeJob::spawn(InMemorySink::new(), cfg(), frames(4)).unwrap();
    let events: Vec<_> = job.events.iter().collect();
    let _ = job.handle.join();

    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert!(matches!(events.last(), Some(EncodeEvent::Finished(_))));
    let progress: Vec<f32> = events
        .iter()
        .filter_map(|e| match e {
            EncodeEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![0.2, 0.4, 0.6, 0.8, 1.0]);
}

#[test]
fn sink_receives_frames_in_order() {
    let job = EncodeJob::spawn(InMemorySink::new(), cfg(), frames(5)).unwrap();
    let mut seen = Vec::new();
    let (result, sink) = job.join(|p| seen.push(p));
    assert_eq!(result.unwrap(), Vec::<u8>::new());
    assert_eq!(seen.len(), 6);
    assert_eq!(seen.last(), Some(&1.0));

    let sink = sink.unwrap();
    assert!(sink.ended);
    let idx: Vec<u64> = sink.frames.iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2, 3, 4]);
    assert_eq!(sink.delays(), vec![10, 11, 12, 13, 14]);
}

#[test]
fn sink_failure_surfaces_as_encoding_error() {
    let job = EncodeJob::spawn(FailingSink { fail_at: 2 }, cfg(), frames(4)).unwrap();
    let mut seen = 0;
    let err = job.wait(|_| seen += 1).unwrap_err();
    assert!(matches!(err, ElimError::Encoding(_)));
    assert!(err.to_string().contains("quantiser blew up"));
    assert_eq!(seen, 2);
}

struct FailingEnd;

impl FrameSink for FailingEnd {
    fn begin(&mut self, _cfg: EncodeConfig) -> ElimResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &Frame) -> ElimResult<()> {
        Ok(())
    }

    fn end(&mut self) -> ElimResult<Vec<u8>> {
        Err(ElimError::encoding("lzw stream truncated"))
    }
}

#[test]
fn full_progress_waits_for_the_sink_to_finish() {
    let job = EncodeJob::spawn(FailingEnd, cfg(), frames(3)).unwrap();
    let mut seen = Vec::new();
    let err = job.wait(|p| seen.push(p)).unwrap_err();
    assert!(err.to_string().contains("lzw stream truncated"));
    assert_eq!(seen, vec![0.25, 0.5, 0.75]);
}
