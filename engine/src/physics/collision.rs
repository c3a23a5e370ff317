//! Collision detection: broad-phase pair rejection and the oriented-box
//! vertex-vs-face narrow phase.
//!
//! Detection is a brute-force scan over ordered pairs of valid bodies.
//! Immovable bodies (walls, fixed blocks) never initiate a pair but can
//! be struck; same-group pairs and exempted pairs are skipped. Surviving
//! pairs go through a bounding-sphere reject and then the narrow phase:
//! every world-space vertex of the initiating body against every face of
//! the other. A vertex within tolerance of a face plane and inside the
//! face quad becomes a [`Contact`] only when the bodies are approaching
//! along the face normal; separating configurations are not collisions.
//!
//! The same narrow-phase routine serves the full scan and the
//! single-pair probe ([`PhysicsWorld::check_pair_collision`]), so the
//! two cannot drift apart.
//!
//! [`PhysicsWorld::check_pair_collision`]: super::world::PhysicsWorld::check_pair_collision

use glam::Vec3;
use tracing::trace;

use super::body::{BodyKind, RigidBody};
use super::geometry::{is_point_on_face, point_plane_distance, BOX_FACES};

/// One vertex/face contact, produced and consumed within a single step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Initiating body (its vertex is the contact point).
    pub body_a: usize,
    /// Struck body (its face supplies the normal).
    pub body_b: usize,
    /// Contact location in world space.
    pub point: Vec3,
    /// Unit normal, outward from `body_b`'s face.
    pub normal: Vec3,
    /// Relative contact-point velocity, `body_a` minus `body_b`.
    pub relative_velocity: Vec3,
    /// Unit vector in the collision plane opposing the tangential
    /// component of the relative velocity; zero for head-on contacts.
    pub tangent: Vec3,
}

/// Narrow phase for one ordered pair: vertices of `a` against the six
/// faces of `b`. Appends every approaching contact found, in face-table
/// order, and reports whether any was found.
///
/// Shared by the full pair scan and the single-pair probe; the probe
/// deliberately skips the broad phase and exemption rules, matching the
/// grasp logic's use of it on hypothetical configurations.
pub(crate) fn check_box_collision(
    bodies: &[RigidBody],
    a: usize,
    b: usize,
    tolerance: f32,
    contacts: &mut Vec<Contact>,
) -> bool {
    let body_a = &bodies[a];
    let body_b = &bodies[b];
    let va = body_a.world_vertices();
    let vb = body_b.world_vertices();
    let mut found = false;

    for vertex in va {
        for face in BOX_FACES {
            let f: [Vec3; 4] = face.map(|i| vb[i]);
            let u = f[1] - f[0];
            let v = f[3] - f[0];

            let distance = point_plane_distance(vertex, u, v, f[0]);
            if distance.abs() >= tolerance {
                continue;
            }
            if !is_point_on_face(vertex, &f) {
                continue;
            }

            // Contact-point velocities. The lever arm is world-frame
            // while the linear part is the body-frame velocity, rotated
            // afterwards by the body's own orientation; this is the
            // engine's historical convention and the resolver's
            // restitution constant is tuned against it.
            let r1 = vertex - body_a.position;
            let r2 = vertex - body_b.position;
            let vel1 = body_a.orientation * (body_a.velocity_body + body_a.angular_velocity.cross(r1));
            let vel2 = body_b.orientation * (body_b.velocity_body + body_b.angular_velocity.cross(r2));

            let normal = u.cross(v).normalize();
            let relative_velocity = vel1 - vel2;
            let approach = relative_velocity.dot(normal);
            if approach >= 0.0 {
                // Separating or sliding along the face: not a collision.
                continue;
            }

            let tangent = -(relative_velocity - approach * normal);
            contacts.push(Contact {
                body_a: a,
                body_b: b,
                point: vertex,
                normal,
                relative_velocity,
                tangent: tangent.normalize_or_zero(),
            });
            found = true;
        }
    }
    found
}

/// Full O(n^2) pair scan. Clears and refills `contacts`, sets the
/// `collided`/`collided_with` scratch fields on every body involved, and
/// reports whether any contact was found.
///
/// Contact order is deterministic: initiating-body-index major, struck
/// body index, then vertex and face order within the pair.
pub(crate) fn detect_collisions(
    bodies: &mut [RigidBody],
    tolerance: f32,
    contacts: &mut Vec<Contact>,
) -> bool {
    contacts.clear();
    let count = bodies.len();
    let mut any = false;

    for i in 0..count {
        if !bodies[i].valid || bodies[i].kind.is_immovable() {
            continue;
        }
        for j in 0..count {
            if i == j || !bodies[j].valid {
                continue;
            }
            // A rigid composite never self-collides.
            if bodies[i].group.is_some() && bodies[i].group == bodies[j].group {
                continue;
            }
            // Exemptions are honored from either side.
            if bodies[i].exempt_group.is_some() && bodies[i].exempt_group == bodies[j].group {
                continue;
            }
            if bodies[j].exempt_group.is_some() && bodies[j].exempt_group == bodies[i].group {
                continue;
            }

            // Broad phase: bounding sphere overlap.
            let gap = bodies[i].position - bodies[j].position;
            if gap.length() >= bodies[i].bounding_radius + bodies[j].bounding_radius {
                continue;
            }

            if check_box_collision(&*bodies, i, j, tolerance, contacts) {
                any = true;
                trace!(body_a = i, body_b = j, "narrow phase contact");
                note_collision(bodies, i, j);
                note_collision(bodies, j, i);
            }
        }
    }
    any
}

/// Record on `this` that it collided with `other` this step.
///
/// Ship bounding boxes prefer reporting "real" obstacles: once a ship
/// has any recorded collider, a monster contact never overwrites it,
/// while a non-monster contact upgrades a monster one.
fn note_collision(bodies: &mut [RigidBody], this: usize, other: usize) {
    if bodies[this].kind == BodyKind::ShipBlock && bodies[this].collided {
        if bodies[other].kind != BodyKind::MonsterBlock {
            bodies[this].collided_with = Some(other);
        }
    } else {
        bodies[this].collided = true;
        bodies[this].collided_with = Some(other);
    }
}
