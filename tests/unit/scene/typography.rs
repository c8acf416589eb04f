use super::*;
use crate::camera::{CameraConfig, PerspectiveCamera};
use crate::foundation::core::Canvas;
use crate::viewport::ViewportProvider;

fn provider(w: u32, h: u32) -> ViewportProvider {
    let canvas = Canvas::new(w, h).unwrap();
    let camera = PerspectiveCamera::new(&CameraConfig::default(), canvas).unwrap();
    ViewportProvider::new(camera, canvas)
}

#[test]
fn defaults_carry_the_two_lines() {
    let cfg = TypographyConfig::default();
    assert_eq!(cfg.line_1, "How is it made?");
    assert_eq!(cfg.line_2, "Displacement");
    assert_eq!(cfg.size, 14.0);
    assert!(cfg.light_font.ends_with("IBMPlexSans-Light.ttf"));
    assert!(cfg.medium_font.ends_with("IBMPlexSans-Medium.ttf"));
}

#[test]
fn nodes_use_viewport_relative_sizes() {
    let p = provider(1280, 720);
    let vp = p.current();
    let [l1, l2] = layout_nodes(&TypographyConfig::default(), &vp);
    assert_eq!(l1.text, LINE_1);
    assert_eq!(l1.font, FontRole::Light);
    assert!((l1.font_size - vp.width * 2.0 / 100.0).abs() < 1e-4);
    assert!((l1.position.y - vp.height * 0.1).abs() < 1e-4);
    assert_eq!(l1.position.x, 0.0);

    assert_eq!(l2.text, LINE_2);
    assert_eq!(l2.font, FontRole::Medium);
    assert!((l2.font_size - vp.width * 0.14).abs() < 1e-4);
    assert_eq!(l2.position, Vec2::ZERO);
}

#[test]
fn plane_matches_viewport_and_follows_resize() {
    let mut p = provider(1280, 720);
    let mut panel = TypographyPanel::new(&TypographyConfig::default(), p.subscribe()).unwrap();
    let vp = p.current();
    assert_eq!(panel.plane_size(), Vec2::new(vp.width, vp.height));

    p.resize(720, 1280).unwrap();
    assert!(panel.sync_viewport());
    let vp = p.current();
    assert_eq!(panel.plane_size(), Vec2::new(vp.width, vp.height));
    let mesh = panel.mesh().unwrap();
    let max_x = mesh.positions.iter().map(|v| v.x).fold(f32::MIN, f32::max);
    assert!((max_x * 2.0 - vp.width).abs() < 1e-4);
    assert!((panel.nodes()[1].font_size - vp.vw(14.0)).abs() < 1e-4);
    assert!(!panel.sync_viewport());
}

#[test]
fn rejects_empty_lines() {
    let cfg = TypographyConfig {
        line_2: "  ".to_owned(),
        ..TypographyConfig::default()
    };
    assert!(cfg.validate().is_err());
}
