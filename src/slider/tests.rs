use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

fn vertical_slider() -> PositionSlider {
    PositionSlider::new(Orientation::Vertical, Rect::from_size(48, 320))
}

fn horizontal_slider() -> PositionSlider {
    PositionSlider::new(Orientation::Horizontal, Rect::from_size(320, 48))
}

fn record_notifications(slider: &mut PositionSlider) -> Arc<Mutex<Vec<f64>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    slider.set_position_listener(move |value| sink.lock().push(value));
    seen
}

#[test]
fn test_new_slider_starts_at_zero() {
    let slider = vertical_slider();
    assert_eq!(slider.position(), 0.0);
    assert_eq!(slider.orientation(), Orientation::Vertical);
    assert_eq!(slider.redraw_requests(), 0);
}

#[test]
fn test_set_position_notifies_and_redraws() {
    let mut slider = vertical_slider();
    let seen = record_notifications(&mut slider);

    assert!(slider.set_position(0.4));
    assert_eq!(slider.position(), 0.4);
    assert_eq!(*seen.lock(), vec![0.4]);
    assert!(slider.take_redraw());
    assert!(!slider.take_redraw());
}

#[test]
fn test_repeated_position_is_noop() {
    let mut slider = vertical_slider();
    let seen = record_notifications(&mut slider);

    assert!(slider.set_position(0.7));
    assert!(!slider.set_position(0.7));

    assert_eq!(seen.lock().len(), 1);
    assert_eq!(slider.redraw_requests(), 1);
}

#[test]
fn test_set_position_clamps() {
    let mut slider = vertical_slider();
    let seen = record_notifications(&mut slider);

    slider.set_position(1.7);
    assert_eq!(slider.position(), 1.0);
    slider.set_position(-3.0);
    assert_eq!(slider.position(), 0.0);
    slider.set_position(f64::INFINITY);
    assert_eq!(slider.position(), 1.0);

    assert_eq!(*seen.lock(), vec![1.0, 0.0, 1.0]);
}

#[test]
fn test_nan_position_is_ignored() {
    let mut slider = vertical_slider();
    let seen = record_notifications(&mut slider);

    slider.set_position(0.5);
    assert!(!slider.set_position(f64::NAN));
    assert_eq!(slider.position(), 0.5);
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn test_clamped_set_from_boundary_is_noop() {
    let mut slider = vertical_slider();
    let seen = record_notifications(&mut slider);

    // 0.0 is the starting position, so a clamped negative value changes nothing
    assert!(!slider.set_position(-0.5));
    assert!(seen.lock().is_empty());
    assert_eq!(slider.redraw_requests(), 0);
}

#[test]
fn test_increment_clamps_at_top() {
    let mut slider = vertical_slider();
    slider.set_position(0.95);
    assert!(slider.increment());
    assert_eq!(slider.position(), 1.0);

    let seen = record_notifications(&mut slider);
    assert!(!slider.increment());
    assert_eq!(slider.position(), 1.0);
    assert!(seen.lock().is_empty());
}

#[test]
fn test_decrement_clamps_at_bottom() {
    let mut slider = vertical_slider();
    slider.set_position(0.05);
    assert!(slider.decrement());
    assert_eq!(slider.position(), 0.0);

    let seen = record_notifications(&mut slider);
    assert!(!slider.decrement());
    assert!(seen.lock().is_empty());
}

#[test]
fn test_increment_then_decrement_returns() {
    let mut slider = vertical_slider();
    for start in [0.1, 0.3, 0.55, 0.8] {
        slider.set_position(start);
        slider.increment();
        slider.decrement();
        assert!((slider.position() - start).abs() < 1e-9, "start {}", start);
    }
}

#[test]
fn test_increment_accumulation_reaches_top_once() {
    let mut slider = vertical_slider();
    let seen = record_notifications(&mut slider);

    for _ in 0..10 {
        slider.increment();
    }
    // Ten steps of 0.1 accumulate to just under 1.0
    assert!(slider.position() < 1.0);
    assert!(slider.position() > 0.999);

    assert!(slider.increment());
    assert_eq!(slider.position(), 1.0);
    assert!(!slider.increment());

    assert_eq!(seen.lock().len(), 11);
}

#[test]
fn test_vertical_touch_projection() {
    let mut slider = vertical_slider();

    slider.handle_touch(10.0, 320.0);
    assert_eq!(slider.position(), 0.0);

    slider.handle_touch(10.0, 160.0);
    assert_eq!(slider.position(), 0.5);

    slider.handle_touch(10.0, 0.0);
    assert_eq!(slider.position(), 1.0);

    slider.handle_touch(10.0, 400.0);
    assert_eq!(slider.position(), 0.0);

    slider.handle_touch(10.0, -50.0);
    assert_eq!(slider.position(), 1.0);
}

#[test]
fn test_horizontal_touch_projection() {
    let mut slider = horizontal_slider();
    let seen = record_notifications(&mut slider);

    slider.handle_touch(80.0, 999.0);
    assert_eq!(slider.position(), 0.25);

    slider.handle_touch(-10.0, 0.0);
    assert_eq!(slider.position(), 0.0);

    assert_eq!(*seen.lock(), vec![0.25, 0.0]);
}

#[test]
fn test_touch_uses_offset_bounds() {
    let mut slider = PositionSlider::new(Orientation::Horizontal, Rect::new(100, 0, 300, 48));
    assert_eq!(slider.fraction_at(200.0, 10.0), Some(0.5));
    slider.handle_touch(150.0, 10.0);
    assert_eq!(slider.position(), 0.25);
}

#[test]
fn test_touch_on_empty_bounds_is_ignored() {
    let mut slider = PositionSlider::new(Orientation::Vertical, Rect::new(0, 50, 48, 50));
    let seen = record_notifications(&mut slider);

    assert!(!slider.handle_touch(10.0, 20.0));
    assert_eq!(slider.fraction_at(10.0, 20.0), None);
    assert!(seen.lock().is_empty());
}

#[test]
fn test_slider_without_listener_still_moves() {
    let mut slider = horizontal_slider();
    assert!(slider.set_position(0.3));
    assert_eq!(slider.position(), 0.3);
}

#[test]
fn test_vertical_layout() {
    let mut slider = vertical_slider();

    let layout = slider.layout();
    assert_eq!(layout.track, Rect::new(19, 10, 29, 310));
    assert_eq!(layout.indicator, Rect::new(0, 272, 48, 320));

    slider.set_position(0.5);
    assert_eq!(slider.layout().indicator, Rect::new(0, 136, 48, 184));

    slider.set_position(1.0);
    assert_eq!(slider.layout().indicator, Rect::new(0, 0, 48, 48));
}

#[test]
fn test_horizontal_layout() {
    let mut slider = horizontal_slider();

    let layout = slider.layout();
    assert_eq!(layout.track, Rect::new(10, 19, 310, 29));
    assert_eq!(layout.indicator, Rect::new(0, 0, 48, 48));

    slider.set_position(1.0);
    assert_eq!(slider.layout().indicator, Rect::new(272, 0, 320, 48));
}

#[test]
fn test_track_thickness_fallback() {
    let thin = SliderStyle {
        indicator_size: (48, 48),
        track_thickness: 0,
    };
    let slider = vertical_slider().with_style(thin);
    assert_eq!(slider.layout().track, Rect::new(19, 10, 29, 310));

    let wide = SliderStyle {
        indicator_size: (48, 48),
        track_thickness: 20,
    };
    let slider = vertical_slider().with_style(wide);
    assert_eq!(slider.layout().track, Rect::new(14, 10, 34, 310));
}

#[test]
fn test_render_is_side_effect_free() {
    let mut slider = vertical_slider();
    slider.set_position(0.25);
    slider.take_redraw();
    let requests = slider.redraw_requests();

    let mut first = RecordingCanvas::new();
    let mut second = RecordingCanvas::new();
    let layout = slider.render(&mut first);
    slider.render(&mut second);

    assert_eq!(first.calls, second.calls);
    assert_eq!(
        first.calls,
        vec![
            (Drawable::Track, layout.track),
            (Drawable::Indicator, layout.indicator)
        ]
    );
    assert_eq!(slider.position(), 0.25);
    assert_eq!(slider.redraw_requests(), requests);
    assert!(!slider.take_redraw());
}

#[test]
fn test_text_canvas_draws_indicator() {
    let mut slider = vertical_slider();
    slider.set_position(1.0);

    let mut canvas = TextCanvas::for_bounds(slider.bounds(), 16);
    slider.render(&mut canvas);
    let lines = canvas.lines();

    assert_eq!(lines.len(), 20);
    assert!(lines[0].contains('#'));
    assert!(!lines[19].contains('#'));
    assert!(lines[10].contains(':'));
}

#[test]
fn test_measure_follows_indicator() {
    let vertical = vertical_slider();
    assert_eq!(vertical.measure((400, 300)), (48, 300));

    let horizontal = horizontal_slider();
    assert_eq!(horizontal.measure((400, 300)), (400, 48));
}

#[test]
fn test_set_bounds_requests_redraw() {
    let mut slider = vertical_slider();
    slider.set_bounds(Rect::from_size(48, 320));
    assert_eq!(slider.redraw_requests(), 0);

    slider.set_bounds(Rect::from_size(48, 400));
    assert!(slider.take_redraw());
}
