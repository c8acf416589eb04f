use super::*;
use crate::environment::EnvironmentPreset;

#[test]
fn empty_object_yields_defaults() {
    let cfg = SceneConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, SceneConfig::default());
    assert_eq!((cfg.width, cfg.height), (1280, 720));
    assert_eq!(cfg.camera.position, [0.0, 0.0, 50.0]);
    assert_eq!(
        cfg.environment,
        EnvironmentSource::Preset(EnvironmentPreset::Warehouse)
    );
    assert!(cfg.overlay.enabled);
}

#[test]
fn nested_overrides_parse() {
    let json = r##"{
        "width": 640,
        "height": 480,
        "background": "#101010",
        "bubble": { "width_segments": 32, "displace": { "strength": 1.5 } },
        "typography": { "line_1": "Why?" },
        "environment": { "preset": "sunset" }
    }"##;
    let cfg = SceneConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.width, 640);
    assert_eq!(cfg.bubble.width_segments, 32);
    assert_eq!(cfg.bubble.height_segments, 128);
    assert_eq!(cfg.bubble.displace.strength, 1.5);
    assert_eq!(cfg.bubble.displace.scale, 0.25);
    assert_eq!(cfg.typography.line_1, "Why?");
    assert_eq!(cfg.typography.line_2, "Displacement");
    assert_eq!(
        cfg.environment,
        EnvironmentSource::Preset(EnvironmentPreset::Sunset)
    );
}

#[test]
fn unknown_fields_are_rejected() {
    let err = SceneConfig::from_reader(r#"{ "fps": 60 }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, BubbleError::Serde(_)));
    let err =
        SceneConfig::from_reader(r#"{ "bubble": { "wobble": 1 } }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, BubbleError::Serde(_)));
}

#[test]
fn invalid_values_fail_validation() {
    for json in [
        r#"{ "width": 0 }"#,
        r#"{ "camera": { "fov_deg": 0 } }"#,
        r#"{ "typography": { "light_font": "../etc/passwd" } }"#,
        r#"{ "environment": { "file": "/abs.hdr" } }"#,
    ] {
        let err = SceneConfig::from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, BubbleError::Validation(_)), "{json}: {err}");
    }
}

#[test]
fn asset_requests_mirror_config() {
    let cfg = SceneConfig::default();
    let req = cfg.asset_requests();
    assert_eq!(req.light_font, cfg.typography.light_font);
    assert_eq!(req.medium_font, cfg.typography.medium_font);
    assert_eq!(req.environment, cfg.environment);
}

#[test]
fn missing_file_is_reported() {
    assert!(SceneConfig::from_path("/definitely/not/here.json").is_err());
}

#[test]
fn demo_scene_spells_out_the_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/scene.json");
    let cfg = SceneConfig::from_path(path).unwrap();
    assert_eq!(cfg, SceneConfig::default());
}
