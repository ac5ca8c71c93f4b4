use super::*;

fn capture() -> InputCapture {
    InputCapture::new(ActiveColor::default(), Throttle::new(10.0))
}

// =============================================================
// ActiveColor
// =============================================================

#[test]
fn active_color_defaults_to_black() {
    assert_eq!(ActiveColor::default().get(), "black");
}

#[test]
fn active_color_clones_share_the_slot() {
    let palette = ActiveColor::default();
    let reader = palette.clone();
    palette.set("red");
    assert_eq!(reader.get(), "red");
}

#[test]
fn active_color_ignores_blank_values() {
    let color = ActiveColor::new("blue");
    assert!(!color.set("  "));
    assert_eq!(color.get(), "blue");
}

#[test]
fn active_color_only_accepts_palette_entries() {
    let color = ActiveColor::default();
    assert!(!color.set("purple"));
    assert!(!color.set("#ff0000"));
    assert_eq!(color.get(), "black");

    assert!(color.set(" Yellow "));
    assert_eq!(color.get(), "yellow");
}

#[test]
fn every_palette_entry_is_selectable() {
    let color = ActiveColor::default();
    for entry in crate::consts::PALETTE {
        assert!(color.set(entry));
        assert_eq!(color.get(), entry);
        assert_eq!(palette_color(entry), Some(entry));
    }
    assert_eq!(palette_color("magenta"), None);
}

// =============================================================
// Gesture state machine
// =============================================================

#[test]
fn starts_idle() {
    let input = capture();
    assert_eq!(input.state(), GestureState::Idle);
    assert!(!input.is_drawing());
}

#[test]
fn pointer_down_records_start_without_emitting() {
    let mut input = capture();
    input.pointer_down(Point::new(5.0, 6.0));
    assert_eq!(input.state(), GestureState::Drawing { last: Point::new(5.0, 6.0) });
}

#[test]
fn move_while_idle_emits_nothing() {
    let mut input = capture();
    assert!(input.pointer_move(Point::new(1.0, 1.0), 0.0).is_none());
}

#[test]
fn move_emits_segment_from_last_point_and_advances() {
    let mut input = capture();
    input.pointer_down(Point::new(0.0, 0.0));

    let captured = input.pointer_move(Point::new(10.0, 0.0), 0.0).expect("segment");
    assert_eq!(captured.segment.from, Point::new(0.0, 0.0));
    assert_eq!(captured.segment.to, Point::new(10.0, 0.0));
    assert_eq!(captured.color, "black");
    assert_eq!(input.state(), GestureState::Drawing { last: Point::new(10.0, 0.0) });
}

#[test]
fn throttled_move_keeps_last_point() {
    let mut input = capture();
    input.pointer_down(Point::new(0.0, 0.0));
    assert!(input.pointer_move(Point::new(1.0, 0.0), 0.0).is_some());
    assert!(input.pointer_move(Point::new(2.0, 0.0), 3.0).is_none());

    let next = input.pointer_move(Point::new(3.0, 0.0), 10.0).expect("segment");
    assert_eq!(next.segment.from, Point::new(1.0, 0.0));
}

#[test]
fn release_emits_final_segment_even_inside_throttle_window() {
    let mut input = capture();
    input.pointer_down(Point::new(0.0, 0.0));
    assert!(input.pointer_move(Point::new(4.0, 4.0), 0.0).is_some());

    let last = input.pointer_up(Point::new(5.0, 5.0)).expect("final segment");
    assert_eq!(last.segment.from, Point::new(4.0, 4.0));
    assert_eq!(last.segment.to, Point::new(5.0, 5.0));
    assert_eq!(input.state(), GestureState::Idle);
}

#[test]
fn release_while_idle_emits_nothing() {
    let mut input = capture();
    assert!(input.pointer_up(Point::new(1.0, 1.0)).is_none());
}

#[test]
fn leave_ends_the_gesture() {
    let mut input = capture();
    input.pointer_down(Point::new(0.0, 0.0));
    assert!(input.pointer_leave(Point::new(2.0, 2.0)).is_some());
    assert!(!input.is_drawing());
    assert!(input.pointer_leave(Point::new(3.0, 3.0)).is_none());
}

#[test]
fn color_is_read_when_each_segment_is_built() {
    let mut input = capture();
    let palette = input.active_color().clone();
    input.pointer_down(Point::new(0.0, 0.0));

    let first = input.pointer_move(Point::new(1.0, 0.0), 0.0).expect("segment");
    palette.set("green");
    let second = input.pointer_up(Point::new(2.0, 0.0)).expect("segment");

    assert_eq!(first.color, "black");
    assert_eq!(second.color, "green");
}

#[test]
fn gesture_segments_are_chained() {
    let mut input = capture();
    input.pointer_down(Point::new(0.0, 0.0));

    let mut segments = Vec::new();
    for step in 1..=40 {
        let t = f64::from(step) * 2.5;
        if let Some(s) = input.pointer_move(Point::new(t, t * 0.5), t) {
            segments.push(s.segment);
        }
    }
    segments.extend(input.pointer_up(Point::new(200.0, 90.0)).map(|s| s.segment));

    assert!(segments.len() > 2);
    assert_eq!(segments[0].from, Point::new(0.0, 0.0));
    for pair in segments.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    assert_eq!(segments.last().map(|s| s.to), Some(Point::new(200.0, 90.0)));
}
