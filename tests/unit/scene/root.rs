use super::*;
use crate::foundation::core::DVec3;
use crate::scene::typography::{LINE_1, LINE_2};

fn small_config() -> SceneConfig {
    let mut cfg = SceneConfig {
        width: 320,
        height: 180,
        ..SceneConfig::default()
    };
    cfg.bubble.width_segments = 24;
    cfg.bubble.height_segments = 16;
    cfg
}

fn font(path: &str, weight: u16) -> FontAsset {
    FontAsset {
        path: path.to_owned(),
        bytes: Arc::new(Vec::new()),
        family: "Test".to_owned(),
        weight,
    }
}

fn ready_assets() -> SceneAssets {
    SceneAssets {
        light_font: Resource::Ready(font("l.ttf", 300)),
        medium_font: Resource::Ready(font("m.ttf", 500)),
        environment: Resource::Ready(Arc::new(Environment::preset(
            crate::environment::EnvironmentPreset::Warehouse,
        ))),
    }
}

#[test]
fn camera_is_mounted_fifty_units_out() {
    let root = SceneRoot::new(&small_config()).unwrap();
    assert_eq!(root.camera().position, Vec3::new(0.0, 0.0, 50.0));
    assert_eq!(root.camera().fov_deg, 50.0);
}

#[test]
fn pending_assets_suspend() {
    let root = SceneRoot::new(&small_config()).unwrap();
    let mut assets = ready_assets();
    assets.medium_font = Resource::Pending;
    assert!(matches!(root.compose(&assets).unwrap(), Composed::Suspended));
    assert!(matches!(
        root.compose(&SceneAssets::pending()).unwrap(),
        Composed::Suspended
    ));
}

#[test]
fn failed_asset_is_an_error_even_with_pending_siblings() {
    let root = SceneRoot::new(&small_config()).unwrap();
    let mut assets = SceneAssets::pending();
    assets.light_font = Resource::Failed(Arc::new(BubbleError::asset("missing")));
    let err = root.compose(&assets).unwrap_err();
    assert!(matches!(err, BubbleError::Asset(_)));
    assert!(err.to_string().contains("light_font"));
}

#[test]
fn ready_assets_compose_full_graph() {
    let root = SceneRoot::new(&small_config()).unwrap();
    let Composed::Ready(graph) = root.compose(&ready_assets()).unwrap() else {
        panic!("expected a ready scene");
    };
    let vp = root.viewport();
    assert_eq!(graph.viewport, vp);
    assert_eq!(graph.panel.nodes[0].text, LINE_1);
    assert_eq!(graph.panel.nodes[1].text, LINE_2);
    assert_eq!(graph.panel.light_font.weight, 300);
    assert_eq!(graph.bubble.mesh.vertex_count(), 25 * 17);
    assert_eq!(graph.background, Vec3::ZERO);
}

#[test]
fn resize_propagates_to_children() {
    let mut root = SceneRoot::new(&small_config()).unwrap();
    assert!(!root.resize(320, 180).unwrap());
    assert!(root.resize(640, 180).unwrap());
    let vp = root.viewport();
    assert!((root.bubble().radius() - vp.width / 8.0).abs() < 1e-5);
    assert_eq!(root.panel().plane_size().x, vp.width);
    assert_eq!(root.panel().plane_size().y, vp.height);
}

#[test]
fn remount_starts_from_zero_with_identical_geometry() {
    let cfg = small_config();
    let mut first = SceneRoot::new(&cfg).unwrap();
    first.tick(1.5).unwrap();
    assert!(first.bubble().offset().x > 0.0);

    let second = SceneRoot::new(&cfg).unwrap();
    let again = SceneRoot::new(&cfg).unwrap();
    assert_eq!(second.bubble().offset(), DVec3::ZERO);
    assert_eq!(second.bubble().base_mesh(), again.bubble().base_mesh());
    assert_eq!(second.bubble().base_mesh(), first.bubble().base_mesh());
    assert_eq!(second.panel().plane_size(), first.panel().plane_size());
}
