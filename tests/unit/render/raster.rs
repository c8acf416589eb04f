use super::*;
use crate::camera::{CameraConfig, PerspectiveCamera};
use crate::mesh::Mesh;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

fn sv(x: f32, y: f32, z: f32) -> Option<ScreenVertex> {
    Some(ScreenVertex { x, y, z, inv_w: 1.0 })
}

#[test]
fn covers_pixels_inside_a_front_facing_triangle() {
    let mut target = RasterTarget::new(canvas(8, 8), Vec3::ZERO);
    // Positive area in y-down screen space.
    let verts = [sv(0.0, 0.0, 0.0), sv(0.0, 8.0, 0.0), sv(8.0, 0.0, 0.0)];
    draw_indexed(&mut target, &verts, &[0, 1, 2], true, 3, |_| Vec3::ONE);

    assert_eq!(target.at(1, 1), Vec3::ONE);
    assert_eq!(target.at(6, 0), Vec3::ONE);
    assert_eq!(target.at(7, 7), Vec3::ZERO);
}

#[test]
fn back_faces_are_culled_only_when_asked() {
    let verts = [sv(0.0, 0.0, 0.0), sv(8.0, 0.0, 0.0), sv(0.0, 8.0, 0.0)];

    let mut culled = RasterTarget::new(canvas(8, 8), Vec3::ZERO);
    draw_indexed(&mut culled, &verts, &[0, 1, 2], true, 4, |_| Vec3::ONE);
    assert!(culled.color.iter().all(|c| *c == Vec3::ZERO));

    let mut both = RasterTarget::new(canvas(8, 8), Vec3::ZERO);
    draw_indexed(&mut both, &verts, &[0, 1, 2], false, 4, |_| Vec3::ONE);
    assert_eq!(both.at(1, 1), Vec3::ONE);
}

#[test]
fn nearer_fragments_win_regardless_of_order() {
    let near = [sv(0.0, 0.0, -0.5), sv(0.0, 4.0, -0.5), sv(4.0, 0.0, -0.5)];
    let far = [sv(0.0, 0.0, 0.5), sv(0.0, 4.0, 0.5), sv(4.0, 0.0, 0.5)];

    let mut target = RasterTarget::new(canvas(4, 4), Vec3::ZERO);
    draw_indexed(&mut target, &near, &[0, 1, 2], true, 2, |_| Vec3::X);
    draw_indexed(&mut target, &far, &[0, 1, 2], true, 2, |_| Vec3::Y);
    assert_eq!(target.at(0, 0), Vec3::X);

    let mut target = RasterTarget::new(canvas(4, 4), Vec3::ZERO);
    draw_indexed(&mut target, &far, &[0, 1, 2], true, 2, |_| Vec3::Y);
    draw_indexed(&mut target, &near, &[0, 1, 2], true, 2, |_| Vec3::X);
    assert_eq!(target.at(0, 0), Vec3::X);
}

#[test]
fn barycentrics_sum_to_one() {
    let mut target = RasterTarget::new(canvas(16, 16), Vec3::ZERO);
    let verts = [
        Some(ScreenVertex { x: 0.0, y: 0.0, z: 0.0, inv_w: 1.0 }),
        Some(ScreenVertex { x: 0.0, y: 16.0, z: 0.0, inv_w: 0.25 }),
        Some(ScreenVertex { x: 16.0, y: 0.0, z: 0.0, inv_w: 0.5 }),
    ];
    draw_indexed(&mut target, &verts, &[0, 1, 2], true, 16, |f| {
        Vec3::splat(f.bary.x + f.bary.y + f.bary.z)
    });
    for y in 0..8 {
        for x in 0..(7 - y) {
            let v = target.at(x, y).x;
            assert!((v - 1.0).abs() < 1e-5, "({x},{y}) = {v}");
        }
    }
}

#[test]
fn band_height_does_not_change_output() {
    let cam = PerspectiveCamera::new(&CameraConfig::default(), canvas(64, 48)).unwrap();
    let vp = cam.view_projection_matrix();
    let mesh = Mesh::uv_sphere(12.0, 16, 12).unwrap();
    let verts = project_vertices(&mesh.positions, &vp, canvas(64, 48));

    let render = |band_rows| {
        let mut t = RasterTarget::new(canvas(64, 48), Vec3::ZERO);
        draw_indexed(&mut t, &verts, &mesh.indices, true, band_rows, |f| {
            interpolate(&mesh.normals, &mesh.indices, f) * 0.5 + Vec3::splat(0.5)
        });
        t.color
    };
    let a = render(1);
    assert_eq!(a, render(7));
    assert_eq!(a, render(64));
    assert!(a.iter().any(|c| *c != Vec3::ZERO));
}

#[test]
fn projection_centers_the_origin_and_drops_points_behind_camera() {
    let c = canvas(100, 50);
    let cam = PerspectiveCamera::new(&CameraConfig::default(), c).unwrap();
    let vp = cam.view_projection_matrix();
    let out = project_vertices(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 80.0)], &vp, c);
    let center = out[0].unwrap();
    assert!((center.x - 50.0).abs() < 1e-3);
    assert!((center.y - 25.0).abs() < 1e-3);
    assert!(out[1].is_none());
}

#[test]
fn sample_interpolates_between_pixel_centers() {
    let mut t = RasterTarget::new(canvas(2, 1), Vec3::ZERO);
    t.color[1] = Vec3::ONE;
    assert_eq!(t.sample(0.5, 0.5), Vec3::ZERO);
    assert_eq!(t.sample(1.5, 0.5), Vec3::ONE);
    assert!((t.sample(1.0, 0.5).x - 0.5).abs() < 1e-6);
    assert_eq!(t.sample(-10.0, 3.0), Vec3::ZERO);
}
