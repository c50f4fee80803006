use quad_viewer::config::Controls;
use quad_viewer::events::{Button, Key, Transition, ViewerInput};
use quad_viewer::processing::filters::{FilterState, RenderMode};
use quad_viewer::processing::transform::{Point, QuadCorners};
use quad_viewer::tasks::viewer::state::{ImageSize, ViewState};

fn state_with(sizes: &[(u32, u32)]) -> ViewState {
    let images = sizes
        .iter()
        .map(|&(width, height)| ImageSize { width, height })
        .collect();
    ViewState::new(images, Controls::default()).unwrap()
}

fn key(state: &mut ViewState, key: Key) -> Option<Transition> {
    state.apply(&ViewerInput::KeyPressed(key))
}

fn point_close(a: Point, b: Point, eps: f64) {
    assert!(
        (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps,
        "point mismatch: {:?} vs {:?}",
        a,
        b
    );
}

fn corners_close(a: QuadCorners, b: QuadCorners, eps: f64) {
    for (pa, pb) in a.0.iter().zip(b.0.iter()) {
        point_close(*pa, *pb, eps);
    }
}

#[test]
fn digit_keys_land_on_mode_defaults() {
    let expected = [
        (4, RenderMode::WideBlur, 3, 7),
        (3, RenderMode::Blur, 0, 3),
        (2, RenderMode::EdgeDetect, 0, 3),
        (1, RenderMode::Plain, 0, 3),
    ];
    let mut state = state_with(&[(64, 64)]);
    for (digit, mode, filter, kernel) in expected {
        // scramble the sub-selector before switching
        for _ in 0..3 {
            key(&mut state, Key::Up);
        }
        key(&mut state, Key::Digit(digit));
        let f = state.filter();
        assert_eq!((f.mode(), f.filter(), f.kernel()), (mode, filter, kernel));
    }
}

#[test]
fn reselecting_active_mode_changes_nothing() {
    let mut state = state_with(&[(64, 64)]);
    key(&mut state, Key::Digit(3));
    key(&mut state, Key::Up);
    let before = state.filter();
    assert_eq!(key(&mut state, Key::Digit(3)), None);
    assert_eq!(state.filter(), before);
}

#[test]
fn unbound_digit_is_ignored() {
    let mut state = state_with(&[(64, 64)]);
    assert_eq!(key(&mut state, Key::Digit(9)), None);
    assert_eq!(state.filter(), FilterState::default());
}

#[test]
fn up_cycles_through_every_filter() {
    for (digit, mode) in (1..=4).zip(RenderMode::ALL) {
        let mut state = state_with(&[(64, 64)]);
        key(&mut state, Key::Digit(digit));
        let table = mode.table();
        let start = state.filter().filter();
        let mut seen = vec![start];
        for _ in 1..table.cycle_len() {
            key(&mut state, Key::Up);
            seen.push(state.filter().filter());
        }
        let expected: Vec<u32> = (table.first..=table.last)
            .step_by(table.step as usize)
            .collect();
        assert_eq!(seen, expected, "{mode:?}");
        key(&mut state, Key::Up);
        assert_eq!(state.filter().filter(), start, "{mode:?} wrap");
    }
}

#[test]
fn down_cycles_in_reverse() {
    for (digit, mode) in (1..=4).zip(RenderMode::ALL) {
        let mut state = state_with(&[(64, 64)]);
        key(&mut state, Key::Digit(digit));
        let table = mode.table();
        key(&mut state, Key::Down);
        assert_eq!(state.filter().filter(), table.last, "{mode:?}");
        for _ in 1..table.cycle_len() {
            key(&mut state, Key::Down);
        }
        assert_eq!(state.filter().filter(), table.first, "{mode:?}");
    }
}

#[test]
fn wide_blur_kernel_tracks_filter() {
    let mut state = state_with(&[(64, 64)]);
    key(&mut state, Key::Digit(4));
    for _ in 0..25 {
        key(&mut state, Key::Up);
        let f = state.filter();
        assert_eq!(f.kernel(), 2 * f.filter() + 1);
    }
    assert_eq!(state.filter().filter(), 128);
    assert_eq!(state.filter().kernel(), 257);
}

#[test]
fn image_navigation_wraps_both_ways() {
    let mut state = state_with(&[(10, 10), (20, 10), (10, 20)]);
    for _ in 0..3 {
        key(&mut state, Key::Right);
    }
    assert_eq!(state.image_index(), 0);
    assert_eq!(
        key(&mut state, Key::Left),
        Some(Transition::ImageChanged { index: 2 })
    );
    for _ in 0..2 {
        key(&mut state, Key::Left);
    }
    assert_eq!(state.image_index(), 0);
}

#[test]
fn switching_image_refits_and_resets() {
    let mut state = state_with(&[(100, 100), (200, 100)]);
    key(&mut state, Key::Digit(2));
    key(&mut state, Key::Up);
    state.apply(&ViewerInput::Scrolled(3.0));
    key(&mut state, Key::Right);

    assert_eq!(state.corners(), QuadCorners::fit_image(200, 100));
    assert_eq!(state.rotation(), 0.0);
    assert_eq!(state.scale(), 1.0);
    let f = state.filter();
    assert_eq!((f.mode(), f.filter()), (RenderMode::EdgeDetect, 0));
}

#[test]
fn refit_is_idempotent() {
    let mut state = state_with(&[(300, 200)]);
    state.refit_corners();
    let once = state.corners();
    state.refit_corners();
    assert_eq!(state.corners(), once);
    point_close(once.0[1], Point::new(1.0, 200.0 / 300.0), 1e-12);
}

#[test]
fn drag_then_release_moves_corners() {
    let mut state = state_with(&[(64, 64)]);
    let start = QuadCorners([
        Point::new(-1.0, -1.0),
        Point::new(1.0, 1.0),
        Point::new(-1.0, 1.0),
        Point::new(1.0, -1.0),
    ]);
    state.set_corners(start);

    state.apply(&ViewerInput::ButtonPressed {
        button: Button::Left,
        at: Point::ZERO,
    });
    state.apply(&ViewerInput::CursorMoved(Point::new(0.2, -0.1)));
    point_close(state.drag(), Point::new(0.2, -0.1), 1e-12);
    // not yet committed
    assert_eq!(state.corners(), start);
    point_close(state.frame_corners().0[0], Point::new(-0.8, -1.1), 1e-12);

    assert_eq!(
        state.apply(&ViewerInput::ButtonReleased {
            button: Button::Left,
            at: Point::new(0.2, -0.1),
        }),
        Some(Transition::Committed)
    );
    assert_eq!(state.drag(), Point::ZERO);
    let expected = QuadCorners([
        Point::new(-0.8, -1.1),
        Point::new(1.2, 0.9),
        Point::new(-0.8, 0.9),
        Point::new(1.2, -1.1),
    ]);
    corners_close(state.corners(), expected, 1e-12);
}

#[test]
fn quarter_turn_maps_x_axis_to_y_axis() {
    let mut state = state_with(&[(64, 64)]);
    state.set_corners(QuadCorners::from_half_extent(1.0, 0.0));
    state.apply(&ViewerInput::ButtonPressed {
        button: Button::Right,
        at: Point::ZERO,
    });
    // 30 notches of 3 degrees
    for _ in 0..30 {
        state.apply(&ViewerInput::Scrolled(1.0));
    }
    assert!((state.rotation() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    point_close(state.frame_corners().0[3], Point::new(0.0, 1.0), 1e-6);
}

#[test]
fn scroll_scales_and_resets_factor() {
    let mut state = state_with(&[(64, 64)]);
    state.set_corners(QuadCorners::from_half_extent(1.0, 1.0));

    assert_eq!(
        state.apply(&ViewerInput::Scrolled(1.0)),
        Some(Transition::Scaled { factor: 1.05 })
    );
    point_close(state.corners().0[1], Point::new(1.05, 1.05), 1e-12);
    assert_eq!(state.scale(), 1.0);

    state.apply(&ViewerInput::Scrolled(1.0));
    point_close(state.corners().0[1], Point::new(1.1025, 1.1025), 1e-12);
    assert_eq!(state.scale(), 1.0);
}

#[test]
fn render_uniforms_follow_state() {
    use quad_viewer::gpu::FilterUniforms;

    let mut state = state_with(&[(640, 480), (32, 16)]);
    key(&mut state, Key::Digit(3));
    key(&mut state, Key::Up);
    key(&mut state, Key::Right);
    key(&mut state, Key::Up);
    key(&mut state, Key::Up);
    assert_eq!(
        FilterUniforms::for_state(&state),
        FilterUniforms::new(2, 2, 5, 32, 16)
    );
}

#[test]
fn wide_blur_down_steps_kernel_by_ten() {
    let mut state = state_with(&[(64, 64)]);
    key(&mut state, Key::Digit(4));
    let mut seen = Vec::new();
    for _ in 0..27 {
        key(&mut state, Key::Down);
        let f = state.filter();
        seen.push((f.filter(), f.kernel()));
    }
    assert_eq!(&seen[..3], &[(128, 257), (123, 247), (118, 237)]);
    assert_eq!(&seen[24..], &[(8, 17), (3, 7), (128, 257)]);
    for pair in seen.windows(2) {
        let ((f0, k0), (f1, k1)) = (pair[0], pair[1]);
        if f0 != 3 {
            assert_eq!((f1, k1), (f0 - 5, k0 - 10));
        }
    }
}

#[test]
fn mode_switch_mid_drag_resets_filter_and_keeps_drag() {
    let mut state = state_with(&[(64, 64)]);
    key(&mut state, Key::Up);
    key(&mut state, Key::Up);
    state.apply(&ViewerInput::ButtonPressed {
        button: Button::Left,
        at: Point::ZERO,
    });
    state.apply(&ViewerInput::CursorMoved(Point::new(0.3, 0.1)));

    key(&mut state, Key::Digit(4));
    let f = state.filter();
    assert_eq!((f.mode(), f.filter(), f.kernel()), (RenderMode::WideBlur, 3, 7));
    point_close(state.drag(), Point::new(0.3, 0.1), 1e-12);

    // the drag is still live after the switch
    state.apply(&ViewerInput::CursorMoved(Point::new(0.4, 0.1)));
    point_close(state.drag(), Point::new(0.4, 0.1), 1e-12);
}

#[test]
fn image_switch_returns_filter_to_mode_default() {
    let mut state = state_with(&[(64, 64), (32, 64)]);
    key(&mut state, Key::Digit(4));
    for _ in 0..4 {
        key(&mut state, Key::Up);
    }
    assert_eq!(state.filter().filter(), 23);

    key(&mut state, Key::Right);
    // WideBlur's default, not a raw zero outside its 3..=128 range
    let f = state.filter();
    assert_eq!((f.mode(), f.filter(), f.kernel()), (RenderMode::WideBlur, 3, 7));

    key(&mut state, Key::Digit(3));
    key(&mut state, Key::Up);
    key(&mut state, Key::Left);
    let f = state.filter();
    assert_eq!((f.mode(), f.filter(), f.kernel()), (RenderMode::Blur, 0, 3));
}
