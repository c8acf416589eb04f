use super::*;
use crate::foundation::core::DVec3;

fn bubble_material() -> LayerMaterial {
    let displace = DisplaceLayer::new(&DisplaceConfig::default()).unwrap();
    LayerMaterial::new(&MaterialConfig::default(), vec![Layer::Displace(displace)]).unwrap()
}

#[test]
fn defaults_describe_clear_glass() {
    let cfg = MaterialConfig::default();
    assert_eq!(cfg.color, Color::WHITE);
    assert_eq!(cfg.lighting, Lighting::Physical);
    assert_eq!(cfg.transmission, 1.0);
    assert_eq!(cfg.roughness, 0.0);
    assert_eq!(cfg.thickness, 2.0);
    assert_eq!(cfg.ior, 1.5);
    cfg.validate().unwrap();
}

#[test]
fn config_rejects_out_of_range_values() {
    for cfg in [
        MaterialConfig {
            transmission: 1.5,
            ..MaterialConfig::default()
        },
        MaterialConfig {
            roughness: -0.1,
            ..MaterialConfig::default()
        },
        MaterialConfig {
            ior: 0.9,
            ..MaterialConfig::default()
        },
        MaterialConfig {
            thickness: f32::NAN,
            ..MaterialConfig::default()
        },
    ] {
        assert!(cfg.validate().is_err(), "{cfg:?}");
    }
}

#[test]
fn config_parses_partial_json_and_rejects_unknown_fields() {
    let cfg: MaterialConfig =
        serde_json::from_str(r##"{ "color": "#ff0000", "roughness": 0.25 }"##).unwrap();
    assert_eq!(cfg.roughness, 0.25);
    assert_eq!(cfg.transmission, 1.0);
    assert_eq!(cfg.color.to_rgba8(), [255, 0, 0, 255]);
    assert!(serde_json::from_str::<MaterialConfig>(r#"{ "shininess": 1 }"#).is_err());
}

#[test]
fn deform_without_layers_is_identity() {
    let mesh = Mesh::uv_sphere(5.0, 12, 8).unwrap();
    let mat = LayerMaterial::new(&MaterialConfig::default(), Vec::new()).unwrap();
    assert_eq!(mat.deform(&mesh), mesh);
    assert!(mat.displace().is_none());
}

#[test]
fn deform_runs_displace_layer() {
    let mesh = Mesh::uv_sphere(5.0, 12, 8).unwrap();
    let mut mat = bubble_material();
    mat.displace_mut().unwrap().set_offset(DVec3::new(0.37, 0.0, 0.0));
    let out = mat.deform(&mesh);
    assert_eq!(out.indices, mesh.indices);
    assert_ne!(out.positions, mesh.positions);
    assert_eq!(mat.displace().unwrap().offset().x, 0.37);
}
