use super::*;

#[test]
fn preset_names_roundtrip() {
    for p in EnvironmentPreset::ALL {
        assert_eq!(p.name().parse::<EnvironmentPreset>().unwrap(), p);
    }
    assert_eq!(
        "Warehouse".parse::<EnvironmentPreset>().unwrap(),
        EnvironmentPreset::Warehouse
    );
    assert!("moon".parse::<EnvironmentPreset>().is_err());
}

#[test]
fn default_source_is_warehouse_preset() {
    assert_eq!(
        EnvironmentSource::default(),
        EnvironmentSource::Preset(EnvironmentPreset::Warehouse)
    );
    let parsed: EnvironmentSource =
        serde_json::from_value(serde_json::json!({ "preset": "warehouse" })).unwrap();
    assert_eq!(parsed, EnvironmentSource::default());
    let parsed: EnvironmentSource =
        serde_json::from_value(serde_json::json!({ "file": "env/hall.hdr" })).unwrap();
    assert_eq!(parsed, EnvironmentSource::File("env/hall.hdr".to_owned()));
}

#[test]
fn warehouse_ceiling_is_brighter_than_floor() {
    let env = Environment::preset(EnvironmentPreset::Warehouse);
    let up = env.radiance(Vec3::new(0.0, 0.94, 0.34), 0.0);
    let down = env.radiance(-Vec3::Y, 0.0);
    assert!(up.x > down.x);
    for p in EnvironmentPreset::ALL {
        let env = Environment::preset(p);
        for d in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X, -Vec3::Y, -Vec3::Z] {
            let r = env.radiance(d, 0.0);
            assert!(r.is_finite() && r.min_element() >= 0.0, "{p:?}");
        }
    }
}

#[test]
fn roughness_dims_light_peaks() {
    let env = Environment::preset(EnvironmentPreset::Studio);
    let Environment::Procedural(proc_env) = &env else {
        panic!("preset must be procedural");
    };
    let key = proc_env.lights[0].direction;
    let sharp = env.radiance(key, 0.0);
    let rough = env.radiance(key, 1.0);
    assert!(sharp.x > rough.x);
}

#[test]
fn equirect_decodes_png_and_samples_linear() {
    let mut img = image::RgbImage::new(8, 4);
    for p in img.pixels_mut() {
        *p = image::Rgb([255, 255, 255]);
    }
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();

    let map = EquirectMap::decode(&bytes).unwrap();
    assert_eq!((map.width, map.height), (8, 4));
    let env = Environment::Equirect(map);
    let r = env.radiance(Vec3::new(0.3, 0.2, -0.9), 0.0);
    assert!((r.x - 1.0).abs() < 1e-5);
}

#[test]
fn equirect_rejects_garbage() {
    assert!(EquirectMap::decode(b"definitely not an image").is_err());
}
