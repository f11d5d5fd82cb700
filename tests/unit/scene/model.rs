use super::*;
use crate::render::overlay::OverlayStyle;

fn preset(scenes: Vec<SceneSpec>) -> Preset {
    Preset {
        name: "test".to_string(),
        canvas: CanvasPolicy::FitPrimary { max_dimension: 800 },
        overlay: OverlayStyle::red_cross(),
        scenes,
    }
}

#[test]
fn fade_opacity_ramps_to_full() {
    let n = 15;
    let ramp: Vec<f64> = (1..=n).map(|i| fade_opacity(i, n)).collect();
    assert!(ramp.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ramp[0], 1.0 / 15.0);
    assert_eq!(*ramp.last().unwrap(), 1.0);
    for (i, v) in ramp.iter().enumerate() {
        assert_eq!(*v, (i as f64 + 1.0) / 15.0);
    }
}

#[test]
fn fade_delay_splits_total_duration() {
    let s = SceneSpec::FadeOverlay {
        frames: 15,
        total_ms: 2000,
    };
    assert_eq!(s.frame_delay_ms(), 133);
    assert_eq!(s.frame_count(0), 15);
}

#[test]
fn plan_lists_scenes_in_order() {
    let p = preset(vec![
        SceneSpec::Hold { delay_ms: 2000 },
        SceneSpec::FadeOverlay {
            frames: 20,
            total_ms: 2000,
        },
        SceneSpec::GrayscaleFreeze {
            repeats: 4,
            delay_ms: 500,
        },
        SceneSpec::FrameSequence { delay_ms: 200 },
    ]);
    let plan = p.plan(6);
    let names: Vec<_> = plan.iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        vec!["hold", "fade-overlay", "grayscale-freeze", "frame-sequence"]
    );
    assert_eq!(plan[1].delay_ms, 100);
    assert_eq!(plan[3].frames, 6);
    assert_eq!(p.total_frames(6), 1 + 20 + 4 + 6);
    assert!(p.uses_sequence());
}

#[test]
fn validate_rejects_empty_and_degenerate_scenes() {
    assert!(preset(vec![]).validate().is_err());
    assert!(
        preset(vec![SceneSpec::FadeOverlay {
            frames: 0,
            total_ms: 100
        }])
        .validate()
        .is_err()
    );
    assert!(
        preset(vec![SceneSpec::GrayscaleFreeze {
            repeats: 0,
            delay_ms: 100
        }])
        .validate()
        .is_err()
    );
}

#[test]
fn canvas_policy_resolves_fit_and_fixed() {
    let fit = CanvasPolicy::FitPrimary { max_dimension: 800 };
    assert_eq!(
        fit.resolve(1600, 800).unwrap(),
        Canvas {
            width: 800,
            height: 400
        }
    );
    let fixed = CanvasPolicy::Fixed {
        width: 320,
        height: 240,
    };
    assert_eq!(
        fixed.resolve(1600, 800).unwrap(),
        Canvas {
            width: 320,
            height: 240
        }
    );
}

#[test]
fn scene_json_uses_tagged_names() {
    let s = SceneSpec::GrayscaleFreeze {
        repeats: 3,
        delay_ms: 1000,
    };
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["scene"], "grayscale_freeze");
    let back: SceneSpec = serde_json::from_value(v).unwrap();
    assert_eq!(back, s);
}
