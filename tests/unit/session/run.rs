use std::io::Cursor;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::FrameIndex;
use crate::render::frame::Frame;

fn png_file(name: &str, w: u32, h: u32) -> SourceFile {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([40, 90, 160, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    SourceFile::sniffed(name, buf)
}

fn seeded() -> RunConfig {
    RunConfig {
        seed: Some(7),
        ..RunConfig::default()
    }
}

struct BrokenEncoder;

impl FrameSink for BrokenEncoder {
    fn begin(&mut self, _cfg: EncodeConfig) -> ElimResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &Frame) -> ElimResult<()> {
        Err(ElimError::encoding("palette overflow"))
    }

    fn end(&mut self) -> ElimResult<Vec<u8>> {
        Ok(vec![0xff])
    }
}

#[test]
fn transition_table() {
    use RunState::*;
    assert!(Idle.allows(LoadingSources, 3));
    assert!(LoadingSources.allows(RunningScene(0), 3));
    assert!(RunningScene(0).allows(RunningScene(1), 3));
    assert!(!RunningScene(0).allows(RunningScene(2), 3));
    assert!(!RunningScene(1).allows(Encoding, 3));
    assert!(RunningScene(2).allows(Encoding, 3));
    assert!(Encoding.allows(Complete, 3));
    assert!(Encoding.allows(Failed, 3));
    assert!(!Idle.allows(Complete, 3));
    assert!(!Idle.allows(Failed, 3));
    assert!(!Complete.allows(LoadingSources, 3));
    assert!(!Failed.allows(LoadingSources, 3));
}

#[test]
fn start_twice_is_illegal() {
    let mut run = GenerationRun::new();
    assert_eq!(run.state(), RunState::Idle);
    run.start().unwrap();
    assert_eq!(run.state(), RunState::LoadingSources);
    assert!(matches!(run.start(), Err(ElimError::Validation(_))));
}

#[test]
fn execute_walks_every_state_and_completes() {
    let (tx, rx) = mpsc::channel();
    let mut run = GenerationRun::new().with_events(tx);
    let sink = run
        .execute(&[png_file("big.png", 1600, 800)], &seeded(), InMemorySink::new())
        .unwrap();

    assert_eq!(run.state(), RunState::Complete);
    assert_eq!(run.progress(), 100.0);
    assert_eq!(run.frame_count(), 19);
    assert!(run.bytes().is_some());

    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (800, 400));
    assert!(sink.frames.iter().all(|(_, f)| f.width() == 800 && f.height() == 400));

    let events: Vec<RunEvent> = rx.try_iter().collect();
    let states: Vec<RunState> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::State(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            RunState::LoadingSources,
            RunState::RunningScene(0),
            RunState::RunningScene(1),
            RunState::RunningScene(2),
            RunState::Encoding,
            RunState::Complete,
        ]
    );

    let progress: Vec<f32> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert!(matches!(
        events.last(),
        Some(RunEvent::Completed { frames: 19, .. })
    ));
}

#[test]
fn rejected_uploads_are_published_as_notices() {
    let (tx, rx) = mpsc::channel();
    let mut run = GenerationRun::new().with_events(tx);
    let files = vec![
        png_file("a.png", 8, 8),
        png_file("b.png", 8, 8),
        SourceFile::sniffed("notes.txt", b"shopping list".to_vec()),
        png_file("c.png", 8, 8),
    ];

    let accepted = run.accept(files);
    let names: Vec<&str> = accepted.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    assert_eq!(run.state(), RunState::Idle);

    let notices: Vec<String> = rx
        .try_iter()
        .filter_map(|e| match e {
            RunEvent::Notice(msg) => Some(msg),
            _ => None,
        })
        .collect();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("notes.txt"), "{notices:?}");

    run.execute(&accepted, &seeded(), InMemorySink::new())
        .unwrap();
    assert!(!rx.try_iter().any(|e| matches!(e, RunEvent::Notice(_))));
}

#[test]
fn encoder_error_fails_the_run_without_bytes() {
    let (tx, rx) = mpsc::channel();
    let mut run = GenerationRun::new().with_events(tx);
    let err = run
        .execute(&[png_file("a.png", 8, 8)], &seeded(), BrokenEncoder)
        .err()
        .unwrap();

    assert!(matches!(err, ElimError::Encoding(_)));
    assert_eq!(run.state(), RunState::Failed);
    assert!(run.bytes().is_none());
    assert!(run.failure().unwrap().contains("palette overflow"));

    let events: Vec<RunEvent> = rx.try_iter().collect();
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, RunEvent::Failed(_)))
            .count(),
        1
    );
    assert!(!events.iter().any(|e| matches!(e, RunEvent::State(RunState::Complete))));
    assert!(!events.iter().any(|e| matches!(e, RunEvent::Completed { .. })));
}

#[test]
fn decode_error_fails_during_loading() {
    let mut run = GenerationRun::new();
    let broken = SourceFile::new("x.png", "image/png", b"not a png".to_vec());
    let err = run
        .execute(&[broken], &seeded(), InMemorySink::new())
        .err()
        .unwrap();
    assert!(matches!(err, ElimError::Decode(_)));
    assert_eq!(run.state(), RunState::Failed);
}

#[test]
fn terminal_runs_need_a_reset() {
    let mut run = GenerationRun::new();
    run.execute(&[png_file("a.png", 8, 8)], &seeded(), InMemorySink::new())
        .unwrap();
    assert!(
        run.execute(&[png_file("a.png", 8, 8)], &seeded(), InMemorySink::new())
            .is_err()
    );
    assert_eq!(run.state(), RunState::Complete);

    run.reset();
    assert_eq!(run.state(), RunState::Idle);
    assert!(run.bytes().is_none());
    assert_eq!(run.progress(), 0.0);
    run.execute(&[png_file("a.png", 8, 8)], &seeded(), InMemorySink::new())
        .unwrap();
}

#[test]
fn identical_inputs_give_identical_plans() {
    let files = [png_file("a.png", 30, 20)];
    let cfg = RunConfig {
        preset: crate::scene::presets::PresetKind::Celebration,
        ..seeded()
    };

    let mut a = GenerationRun::new();
    let sink_a = a.execute(&files, &cfg, InMemorySink::new()).unwrap();
    let mut b = GenerationRun::new();
    let sink_b = b.execute(&files, &cfg, InMemorySink::new()).unwrap();

    assert_eq!(sink_a.delays(), sink_b.delays());
    assert_eq!(sink_a.frames, sink_b.frames);
}
