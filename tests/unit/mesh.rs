use super::*;

#[test]
fn sphere_vertex_and_triangle_counts() {
    let m = Mesh::uv_sphere(2.0, 128, 128).unwrap();
    assert_eq!(m.vertex_count(), 129 * 129);
    // Pole rows contribute one triangle per quad, the rest two.
    assert_eq!(m.triangle_count(), 128 * 128 * 2 - 2 * 128);
    assert_eq!(m.normals.len(), m.positions.len());
    assert_eq!(m.uvs.len(), m.positions.len());
}

#[test]
fn sphere_vertices_lie_on_radius() {
    let m = Mesh::uv_sphere(3.5, 16, 12).unwrap();
    for (p, n) in m.positions.iter().zip(&m.normals) {
        assert!((p.length() - 3.5).abs() < 1e-4);
        assert!((n.length() - 1.0).abs() < 1e-4);
    }
    assert!((m.bounding_radius() - 3.5).abs() < 1e-4);
}

#[test]
fn sphere_triangles_wind_outward() {
    let m = Mesh::uv_sphere(1.0, 24, 16).unwrap();
    for [a, b, c] in m.triangles() {
        let (pa, pb, pc) = (
            m.positions[a as usize],
            m.positions[b as usize],
            m.positions[c as usize],
        );
        let face_n = (pb - pa).cross(pc - pa);
        let centroid = (pa + pb + pc) / 3.0;
        assert!(face_n.dot(centroid) > 0.0);
    }
}

#[test]
fn sphere_rejects_bad_arguments() {
    assert!(Mesh::uv_sphere(0.0, 8, 8).is_err());
    assert!(Mesh::uv_sphere(f32::NAN, 8, 8).is_err());
    assert!(Mesh::uv_sphere(1.0, 2, 8).is_err());
}

#[test]
fn plane_spans_requested_size_and_faces_camera() {
    let m = Mesh::plane(40.0, 22.5).unwrap();
    let min_x = m.positions.iter().map(|p| p.x).fold(f32::MAX, f32::min);
    let max_x = m.positions.iter().map(|p| p.x).fold(f32::MIN, f32::max);
    let min_y = m.positions.iter().map(|p| p.y).fold(f32::MAX, f32::min);
    let max_y = m.positions.iter().map(|p| p.y).fold(f32::MIN, f32::max);
    assert_eq!(max_x - min_x, 40.0);
    assert_eq!(max_y - min_y, 22.5);
    for [a, b, c] in m.triangles() {
        let (pa, pb, pc) = (
            m.positions[a as usize],
            m.positions[b as usize],
            m.positions[c as usize],
        );
        assert!((pb - pa).cross(pc - pa).z > 0.0);
    }
}

#[test]
fn oversized_sphere_is_an_error_not_a_panic() {
    assert!(matches!(
        Mesh::uv_sphere(1.0, u32::MAX, 16),
        Err(BubbleError::Validation(_))
    ));
    assert!(matches!(
        Mesh::uv_sphere(1.0, 70_000, 70_000),
        Err(BubbleError::Validation(_))
    ));
}
