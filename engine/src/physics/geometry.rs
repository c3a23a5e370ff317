//! Geometry helpers shared by the collision narrow phase.
//!
//! The narrow phase asks one question: does a vertex of one box lie on a
//! face of another? That decomposes into a signed point-to-plane distance
//! and a 2-D point-in-quadrilateral test after flattening the face into
//! the cardinal plane its normal is most aligned with. The crossing
//! number polygon test follows O'Rourke's Computational Geometry FAQ.

use glam::{Vec2, Vec3};

/// The six faces of a body's bounding box as quads of corner indices
/// into [`RigidBody::vertices`](super::body::RigidBody::vertices), in
/// enumeration order front, aft, top, bottom, left, right.
///
/// For a face `[a, b, c, d]` the plane is spanned by `u = v[b] - v[a]`
/// and `v = v[d] - v[a]` anchored at `v[a]`; `u x v` points outward.
/// Detection order is deterministic because faces are enumerated in this
/// fixed order.
pub const BOX_FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3], // front
    [7, 6, 5, 4], // aft
    [6, 2, 1, 5], // top
    [4, 0, 3, 7], // bottom
    [4, 5, 1, 0], // left
    [2, 6, 7, 3], // right
];

/// Signed distance from `point` to the plane spanned by `u` and `v`
/// anchored at `on_plane`. Positive on the side `u x v` points to.
pub fn point_plane_distance(point: Vec3, u: Vec3, v: Vec3, on_plane: Vec3) -> f32 {
    let normal = u.cross(v).normalize();
    (point - on_plane).dot(normal)
}

/// Crossing-number point-in-polygon test for a flattened quadrilateral.
///
/// Half-open edge rule: points exactly on the "upper" boundary count as
/// outside, so two aligned boxes sharing a face edge do not register.
pub fn point_in_quad(quad: &[Vec2; 4], point: Vec2) -> bool {
    let mut inside = false;
    let mut j = 3;
    for i in 0..4 {
        let vi = quad[i];
        let vj = quad[j];
        if ((vi.y <= point.y && point.y < vj.y) || (vj.y <= point.y && point.y < vi.y))
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Whether `point`, assumed to lie on the face's plane, projects inside
/// the face quadrilateral `face`.
///
/// Flattens both into whichever cardinal plane the face normal is most
/// aligned with (the axis of strictly largest magnitude is discarded).
/// Returns false for a degenerate face with no dominant normal axis.
pub fn is_point_on_face(point: Vec3, face: &[Vec3; 4]) -> bool {
    let u = face[1] - face[0];
    let v = face[3] - face[0];
    let n = u.cross(v);

    let (quad, p) = if n.x.abs() > n.y.abs() && n.x.abs() > n.z.abs() {
        // flatten in yz plane
        (face.map(|f| Vec2::new(f.y, f.z)), Vec2::new(point.y, point.z))
    } else if n.y.abs() > n.x.abs() && n.y.abs() > n.z.abs() {
        // flatten in xz plane
        (face.map(|f| Vec2::new(f.x, f.z)), Vec2::new(point.x, point.z))
    } else if n.z.abs() > n.x.abs() && n.z.abs() > n.y.abs() {
        // flatten in xy plane
        (face.map(|f| Vec2::new(f.x, f.y)), Vec2::new(point.x, point.y))
    } else {
        return false;
    };

    point_in_quad(&quad, p)
}
