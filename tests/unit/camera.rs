use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn default_config_looks_down_negative_z_from_fifty() {
    let cfg = CameraConfig::default();
    assert_eq!(cfg.position, [0.0, 0.0, 50.0]);
    assert_eq!(cfg.fov_deg, 50.0);
    cfg.validate().unwrap();
}

#[test]
fn origin_projects_to_canvas_center() {
    let c = canvas(640, 360);
    let cam = PerspectiveCamera::new(&CameraConfig::default(), c).unwrap();
    let vp = cam.view_projection_matrix();
    let p = cam.project(&vp, Vec3::ZERO, c).unwrap();
    assert!((p.x - 320.0).abs() < 1e-3);
    assert!((p.y - 180.0).abs() < 1e-3);
    assert!((p.w - 50.0).abs() < 1e-3);
}

#[test]
fn visible_height_edge_projects_to_top_row() {
    let c = canvas(400, 400);
    let cam = PerspectiveCamera::new(&CameraConfig::default(), c).unwrap();
    let half_h = cam.visible_height_at(50.0) * 0.5;
    let vp = cam.view_projection_matrix();
    let top = cam.project(&vp, Vec3::new(0.0, half_h, 0.0), c).unwrap();
    assert!(top.y.abs() < 1e-2, "top.y = {}", top.y);
}

#[test]
fn points_behind_camera_are_rejected() {
    let c = canvas(64, 64);
    let cam = PerspectiveCamera::new(&CameraConfig::default(), c).unwrap();
    let vp = cam.view_projection_matrix();
    assert!(cam.project(&vp, Vec3::new(0.0, 0.0, 60.0), c).is_none());
}

#[test]
fn invalid_configs_are_rejected() {
    let mut cfg = CameraConfig::default();
    cfg.fov_deg = 0.0;
    assert!(cfg.validate().is_err());

    let mut cfg = CameraConfig::default();
    cfg.far = cfg.near;
    assert!(cfg.validate().is_err());

    let mut cfg = CameraConfig::default();
    cfg.position = cfg.target;
    assert!(cfg.validate().is_err());
}
