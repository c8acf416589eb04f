use super::*;
use crate::camera::CameraConfig;

fn provider(w: u32, h: u32) -> ViewportProvider {
    let canvas = Canvas::new(w, h).unwrap();
    let cam = PerspectiveCamera::new(&CameraConfig::default(), canvas).unwrap();
    ViewportProvider::new(cam, canvas)
}

#[test]
fn viewport_matches_frustum_slice_at_target() {
    let p = provider(1600, 900);
    let vp = p.current();
    let expected_h = 2.0 * (25.0f32.to_radians()).tan() * 50.0;
    assert!((vp.height - expected_h).abs() < 1e-4);
    assert!((vp.width - expected_h * 16.0 / 9.0).abs() < 1e-3);
    assert!((vp.factor * vp.width - 1600.0).abs() < 1e-2);
    assert!((vp.vw(14.0) - vp.width * 0.14).abs() < 1e-5);
    assert!((vp.vh(10.0) - vp.height * 0.1).abs() < 1e-5);
}

#[test]
fn subscribers_observe_resize() {
    let mut p = provider(800, 600);
    let mut sub = p.subscribe();
    assert_eq!(sub.latest(), p.current());
    assert!(sub.poll().is_none());

    assert!(p.resize(1200, 600).unwrap());
    let vp = sub.poll().expect("resize must notify");
    assert_eq!(vp.canvas, Canvas::new(1200, 600).unwrap());
    assert_eq!(sub.latest(), p.current());
    assert!(sub.poll().is_none());
}

#[test]
fn unchanged_size_does_not_notify() {
    let mut p = provider(800, 600);
    let mut sub = p.subscribe();
    assert!(!p.resize(800, 600).unwrap());
    assert!(sub.poll().is_none());
}

#[test]
fn several_resizes_coalesce_to_latest() {
    let mut p = provider(800, 600);
    let mut sub = p.subscribe();
    p.resize(400, 300).unwrap();
    p.resize(1000, 300).unwrap();
    let vp = sub.poll().unwrap();
    assert_eq!(vp.canvas.width, 1000);
}

#[test]
fn dropped_subscriptions_are_pruned() {
    let mut p = provider(800, 600);
    let sub = p.subscribe();
    let _keep = p.subscribe();
    assert_eq!(p.subscriber_count(), 2);
    drop(sub);
    p.resize(640, 480).unwrap();
    assert_eq!(p.subscriber_count(), 1);
}

#[test]
fn resize_rejects_zero_size() {
    let mut p = provider(800, 600);
    assert!(p.resize(0, 600).is_err());
}
