use super::*;

fn layer() -> DisplaceLayer {
    DisplaceLayer::new(&DisplaceConfig::default()).unwrap()
}

#[test]
fn defaults_match_bubble_look() {
    let cfg = DisplaceConfig::default();
    assert_eq!(cfg.strength, 3.0);
    assert_eq!(cfg.scale, 0.25);
    assert_eq!(cfg.noise, NoiseKind::Perlin);
    let l = layer();
    assert_eq!(l.offset(), DVec3::ZERO);
}

#[test]
fn rejects_bad_config() {
    assert!(
        DisplaceLayer::new(&DisplaceConfig {
            scale: 0.0,
            ..DisplaceConfig::default()
        })
        .is_err()
    );
    assert!(
        DisplaceLayer::new(&DisplaceConfig {
            strength: f64::INFINITY,
            ..DisplaceConfig::default()
        })
        .is_err()
    );
}

#[test]
fn height_is_bounded_by_strength() {
    let l = layer();
    for i in 0..200 {
        let p = DVec3::new(i as f64 * 0.731, i as f64 * -0.377, i as f64 * 0.151);
        assert!(l.height(p).abs() <= l.strength() * 1.5);
    }
}

#[test]
fn vertices_move_along_their_normal() {
    let l = layer();
    let mesh = Mesh::uv_sphere(10.0, 16, 12).unwrap();
    let out = l.apply(&mesh);
    for ((p0, n0), p1) in mesh.positions.iter().zip(&mesh.normals).zip(&out.positions) {
        let delta = *p1 - *p0;
        let along = delta.dot(*n0);
        assert!((delta - *n0 * along).length() < 1e-3);
        let expected = l.height(p0.as_dvec3()) as f32;
        assert!((along - expected).abs() < 1e-3);
    }
}

#[test]
fn rebuilt_normals_are_unit_and_roughly_outward() {
    let l = layer();
    let mesh = Mesh::uv_sphere(20.0, 32, 24).unwrap();
    let out = l.apply(&mesh);
    for (n, n0) in out.normals.iter().zip(&mesh.normals) {
        assert!((n.length() - 1.0).abs() < 1e-3);
        assert!(n.dot(*n0) > 0.0);
    }
}

#[test]
fn offset_shifts_the_sampled_field() {
    let mut l = layer();
    let p = DVec3::new(1.3, -0.4, 2.2);
    let at_origin = l.height(p + DVec3::new(0.8, 0.0, 0.0));
    l.set_offset(DVec3::new(0.8, 0.0, 0.0));
    assert!((l.height(p) - at_origin).abs() < 1e-12);
}

#[test]
fn zero_strength_leaves_positions_untouched() {
    let l = DisplaceLayer::new(&DisplaceConfig {
        strength: 0.0,
        ..DisplaceConfig::default()
    })
    .unwrap();
    let mesh = Mesh::uv_sphere(3.0, 8, 6).unwrap();
    let out = l.apply(&mesh);
    for (a, b) in out.positions.iter().zip(&mesh.positions) {
        assert!((*a - *b).length() < 1e-5);
    }
}
