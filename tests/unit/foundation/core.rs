use super::*;

#[test]
fn fit_within_clamps_landscape_exactly() {
    let c = Canvas::fit_within(1600, 800, 800).unwrap();
    assert_eq!(c, Canvas { width: 800, height: 400 });
}

#[test]
fn fit_within_clamps_portrait_and_keeps_small_sources() {
    let c = Canvas::fit_within(600, 1200, 800).unwrap();
    assert_eq!(c, Canvas { width: 400, height: 800 });

    let c = Canvas::fit_within(640, 480, 800).unwrap();
    assert_eq!(c, Canvas { width: 640, height: 480 });
}

#[test]
fn fit_within_truncates_the_scaled_side() {
    // 601 * 0.8 = 480.8
    let c = Canvas::fit_within(1000, 601, 800).unwrap();
    assert_eq!(c, Canvas { width: 800, height: 480 });

    let c = Canvas::fit_within(1199, 1500, 800).unwrap();
    assert_eq!(c, Canvas { width: 639, height: 800 });
}

#[test]
fn fit_within_never_collapses_a_side() {
    let c = Canvas::fit_within(10_000, 3, 800).unwrap();
    assert_eq!(c.width, 800);
    assert_eq!(c.height, 1);
}

#[test]
fn empty_canvas_is_unavailable() {
    assert!(matches!(
        Canvas::new(0, 10),
        Err(ElimError::CanvasUnavailable(_))
    ));
}

#[test]
fn with_opacity_rounds_to_u8() {
    let red = Rgba8::opaque(255, 0, 0);
    assert_eq!(red.with_opacity(0.0).a, 0);
    assert_eq!(red.with_opacity(0.5).a, 128);
    assert_eq!(red.with_opacity(1.0).a, 255);
    assert_eq!(red.with_opacity(3.0).a, 255);
}
