use super::*;

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> SourceImage {
    let data = rgba
        .iter()
        .copied()
        .cycle()
        .take((w * h * 4) as usize)
        .collect();
    SourceImage::from_straight_rgba8(w, h, data).unwrap()
}

fn px(bytes: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]
}

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

#[test]
fn new_rejects_unusable_surfaces() {
    assert!(matches!(
        Compositor::new(canvas(0, 4)),
        Err(ElimError::CanvasUnavailable(_))
    ));
    assert!(matches!(
        Compositor::new(canvas(70_000, 4)),
        Err(ElimError::CanvasUnavailable(_))
    ));
}

#[test]
fn new_surface_is_transparent() {
    let mut c = Compositor::new(canvas(4, 4)).unwrap();
    assert!(c.pixels().iter().all(|&b| b == 0));
}

#[test]
fn draw_image_fit_stretches_to_bounds() {
    let mut c = Compositor::new(canvas(16, 8)).unwrap();
    c.draw_image_fit(&solid(2, 2, [0, 0, 255, 255])).unwrap();
    let p = c.pixels().to_vec();
    assert_eq!(px(&p, 16, 8, 4), [0, 0, 255, 255]);
    assert_eq!(px(&p, 16, 1, 1), [0, 0, 255, 255]);
    assert_eq!(px(&p, 16, 14, 6), [0, 0, 255, 255]);
}

#[test]
fn grayscale_uses_rec601_luma() {
    let mut c = Compositor::new(canvas(8, 8)).unwrap();
    c.draw_image_fit(&solid(1, 1, [255, 0, 0, 255])).unwrap();
    c.apply_grayscale();
    let p = c.pixels().to_vec();
    assert_eq!(px(&p, 8, 4, 4), [76, 76, 76, 255]);
}

#[test]
fn grayscale_is_idempotent() {
    let mut buf: Vec<u8> = (0..=255u8)
        .flat_map(|v| [v, v.wrapping_mul(7), v.wrapping_mul(13), 255 - v])
        .collect();
    grayscale_rgba8_in_place(&mut buf);
    let once = buf.clone();
    grayscale_rgba8_in_place(&mut buf);
    assert_eq!(buf, once);
}

#[test]
fn grayscale_leaves_alpha_untouched() {
    let mut buf = vec![10u8, 200, 30, 77, 255, 255, 255, 0];
    grayscale_rgba8_in_place(&mut buf);
    assert_eq!(buf[3], 77);
    assert_eq!(buf[7], 0);
}

#[test]
fn stroke_overlay_draws_over_existing_pixels() {
    let mut c = Compositor::new(canvas(32, 32)).unwrap();
    c.draw_image_fit(&solid(1, 1, [255, 255, 255, 255])).unwrap();
    c.apply_grayscale();
    c.stroke_overlay(
        OverlayPath::DiagonalCross,
        Rgba8::opaque(255, 0, 0),
        6.0,
    )
    .unwrap();
    let p = c.pixels().to_vec();

    // Centre lies on both diagonals; the top-middle edge is far from both strokes.
    assert_eq!(px(&p, 32, 16, 16), [255, 0, 0, 255]);
    assert_eq!(px(&p, 32, 16, 1), [255, 255, 255, 255]);
}

#[test]
fn fully_transparent_stroke_is_a_no_op() {
    let mut c = Compositor::new(canvas(16, 16)).unwrap();
    c.draw_image_fit(&solid(1, 1, [0, 255, 0, 255])).unwrap();
    let before = c.pixels().to_vec();
    c.stroke_overlay(
        OverlayPath::DiagonalCross,
        Rgba8::opaque(255, 0, 0).with_opacity(0.0),
        4.0,
    )
    .unwrap();
    assert_eq!(c.pixels(), before.as_slice());
}

#[test]
fn stroke_overlay_rejects_bad_width() {
    let mut c = Compositor::new(canvas(4, 4)).unwrap();
    assert!(
        c.stroke_overlay(OverlayPath::DiagonalCross, Rgba8::opaque(1, 2, 3), 0.0)
            .is_err()
    );
}

#[test]
fn particle_is_drawn_at_partial_opacity() {
    let mut c = Compositor::new(canvas(32, 32)).unwrap();
    c.draw_particle(&solid(4, 4, [0, 0, 255, 255]), 16.0, 16.0, 0.0, 8.0)
        .unwrap();
    let p = c.pixels().to_vec();
    let centre = px(&p, 32, 16, 16);
    assert!((228..=232).contains(&centre[3]), "alpha {}", centre[3]);
    assert_eq!(px(&p, 32, 2, 2), [0, 0, 0, 0]);
}

#[test]
fn snapshot_is_independent_of_later_mutation() {
    let mut c = Compositor::new(canvas(4, 4)).unwrap();
    c.draw_image_fit(&solid(1, 1, [9, 9, 9, 255])).unwrap();
    let frame = c.snapshot(120);
    c.clear();
    c.draw_image_fit(&solid(1, 1, [200, 0, 0, 255])).unwrap();
    let _ = c.snapshot(120);

    assert_eq!(frame.delay_ms, 120);
    assert!(frame.image.premultiplied);
    assert_eq!(frame.pixel(2, 2).unwrap(), [9, 9, 9, 255]);
}

#[test]
fn clear_resets_to_transparent() {
    let mut c = Compositor::new(canvas(4, 4)).unwrap();
    c.draw_image_fit(&solid(1, 1, [9, 9, 9, 255])).unwrap();
    c.clear();
    assert!(c.snapshot(0).image.data.iter().all(|&b| b == 0));
}
