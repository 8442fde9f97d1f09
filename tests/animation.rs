mod common;

use std::f32::consts::TAU;

use approx::assert_relative_eq;
use common::{angle_gap, session};
use hero_backdrop::scene::NodeKind;
use hero_backdrop::FrameClock;

#[test]
fn globe_and_cloud_follow_elapsed_time_only() {
    let (mut stepped, clock) = session(11);
    for _ in 0..250 {
        clock.advance(1.0 / 60.0);
        stepped.frame();
    }
    let t = clock.elapsed();

    let (mut jumped, _) = session(11);
    jumped.advance(t);

    for s in [&stepped, &jumped] {
        let globe = s.scene().transform(s.globe()).rotation;
        let cloud = s.scene().transform(s.cloud()).rotation;
        assert_eq!(globe.y, (t * 0.05) as f32);
        assert_eq!(cloud.y, (-t * 0.02) as f32);
        assert_eq!(cloud.x, (t * 0.01) as f32);
    }
}

#[test]
fn floater_height_is_a_sine_of_time() {
    let (mut s, clock) = session(5);
    for step in 0..400 {
        clock.set(step as f64 * 0.029);
        let t = s.frame();
        for f in s.floaters() {
            let state = f.state;
            let y = s.scene().transform(f.node).position.y;
            let expected = state.initial_y() + 1.5 * (state.speed() * t + state.phase_offset()).sin();
            assert_eq!(y, expected as f32);
            let (lo, hi) = (state.initial_y() - 1.5, state.initial_y() + 1.5);
            assert!((lo as f32 - 1e-4..=hi as f32 + 1e-4).contains(&y));
        }
    }
}

#[test]
fn floater_spin_depends_on_frame_count() {
    let (mut fast, fast_clock) = session(21);
    let (mut slow, slow_clock) = session(21);

    for _ in 0..60 {
        fast_clock.advance(1.0 / 60.0);
        fast.frame();
    }
    for _ in 0..30 {
        slow_clock.advance(1.0 / 30.0);
        slow.frame();
    }
    // both clocks now read (about) one second; pin them to the same instant
    fast.advance(1.0);
    slow.advance(1.0);

    for (a, b) in fast.floaters().iter().zip(slow.floaters()) {
        let rate = a.state.rotation_rate() as f32;
        let ra = fast.scene().transform(a.node);
        let rb = slow.scene().transform(b.node);

        assert_eq!(ra.position.y, rb.position.y);
        assert!(angle_gap(ra.rotation.x, 61.0 * rate) < 1e-4);
        assert!(angle_gap(rb.rotation.x, 31.0 * rate) < 1e-4);
        assert_eq!(ra.rotation.x, ra.rotation.y);
        if rate.abs() > 1e-5 {
            assert!(angle_gap(ra.rotation.x, rb.rotation.x) > 1e-5);
        }
        assert!((0.0..TAU).contains(&ra.rotation.x));
    }
}

#[test]
fn point_cloud_is_fixed_after_construction() {
    let (mut s, clock) = session(2);
    let before = match &s.scene().node(s.cloud()).kind {
        NodeKind::Points { positions, .. } => positions.clone(),
        other => panic!("cloud is {other:?}"),
    };
    assert_eq!(before.len(), 2100);
    assert!(before.iter().all(|c| (-50.0..50.0).contains(c)));

    for _ in 0..100 {
        clock.advance(0.016);
        s.frame();
    }
    match &s.scene().node(s.cloud()).kind {
        NodeKind::Points { positions, .. } => assert_eq!(positions, &before),
        other => panic!("cloud is {other:?}"),
    }
}

#[test]
fn floaters_sit_on_an_even_ring() {
    let (s, _) = session(8);
    assert_eq!(s.floaters().len(), 5);
    for (i, f) in s.floaters().iter().enumerate() {
        let p = s.scene().transform(f.node).position;
        let angle = p.z.atan2(p.x);
        assert!(angle_gap(angle, TAU * i as f32 / 5.0) < 1e-4);
        let r = f.ring_radius(s.scene());
        assert!((15.0..20.0).contains(&r), "radius {r}");
        assert_relative_eq!(p.y as f64, f.state.initial_y(), epsilon = 1e-5);
    }
}

#[test]
fn every_frame_renders_once() {
    let (mut s, clock) = session(4);
    clock.advance(0.5);
    assert_eq!(s.frame(), 0.5);
    clock.advance(0.5);
    assert_eq!(s.frame(), 1.0);
    assert_eq!(s.surface().renders, 2);
    assert_eq!(s.frame_count(), 2);
}

#[test]
fn group_owns_globe_and_floaters() {
    let (s, _) = session(9);
    let scene = s.scene();
    let children: Vec<_> = scene.children(s.group()).collect();
    assert_eq!(children.len(), 6);
    assert!(children.contains(&s.globe()));
    assert!(s.floaters().iter().all(|f| children.contains(&f.node)));
    assert_eq!(scene.node(s.cloud()).parent, None);
    assert!(scene.lights.point.is_some());
    assert!(scene.lights.ambient.is_some());

    let materials: Vec<_> = s
        .floaters()
        .iter()
        .map(|f| match scene.node(f.node).kind {
            NodeKind::Mesh { material, .. } => material,
            ref other => panic!("floater is {other:?}"),
        })
        .collect();
    assert!(materials.windows(2).all(|w| w[0] == w[1]));
}
