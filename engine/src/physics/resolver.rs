//! Impulse-based collision resolution.
//!
//! Contacts are resolved strictly in list order, not simultaneously:
//! each impulse is applied before the next contact is processed, so
//! later contacts see earlier velocity changes. Impulse magnitudes use
//! the relative velocity captured at detection time.
//!
//! Walls and fixed blocks are treated as infinite mass: they contribute
//! zero inverse mass and inertia to the impulse denominator and never
//! receive velocity changes. A contact between two immovable bodies has
//! a zero denominator and is skipped outright; that configuration is
//! expected (overlapping fixed geometry), not an error.

use std::collections::BTreeMap;

use tracing::trace;

use super::body::RigidBody;
use super::collision::Contact;

/// Apply an impulse (with friction when the contact is sliding) for
/// every contact, in order. Returns the number of contacts actually
/// resolved (degenerate immovable-vs-immovable contacts are skipped).
pub(crate) fn resolve_collisions(
    bodies: &mut [RigidBody],
    contacts: &[Contact],
    groups: &BTreeMap<usize, Vec<usize>>,
    restitution: f32,
    friction: f32,
) -> usize {
    let mut resolved = 0;

    for contact in contacts {
        let b1 = contact.body_a;
        let b2 = contact.body_b;
        let n = contact.normal;

        let r1 = contact.point - bodies[b1].position;
        let r2 = contact.point - bodies[b2].position;

        // Effective-mass denominator of the impulse formula.
        let denominator = bodies[b1].effective_inverse_mass()
            + bodies[b2].effective_inverse_mass()
            + n.dot((bodies[b1].effective_inverse_inertia() * r1.cross(n)).cross(r1))
            + n.dot((bodies[b2].effective_inverse_inertia() * r2.cross(n)).cross(r2));
        if denominator < f32::EPSILON {
            // Both bodies immovable.
            trace!(body_a = b1, body_b = b2, "skipping immovable pair");
            continue;
        }

        let j = -(1.0 + restitution) * contact.relative_velocity.dot(n) / denominator;

        // Sliding contacts get a friction term along the tangent.
        let tangential_speed = contact.relative_velocity.dot(contact.tangent);
        let impulse = if tangential_speed.abs() > 0.0 {
            j * n + (friction * j) * contact.tangent
        } else {
            j * n
        };

        if !bodies[b1].kind.is_immovable() {
            bodies[b1].velocity += impulse / bodies[b1].mass;
            bodies[b1].angular_velocity += bodies[b1].inverse_inertia * r1.cross(impulse);
        }
        if !bodies[b2].kind.is_immovable() {
            bodies[b2].velocity -= impulse / bodies[b2].mass;
            bodies[b2].angular_velocity -= bodies[b2].inverse_inertia * r2.cross(impulse);
        }

        // A struck group member drags its whole composite with it.
        broadcast_to_group(bodies, groups, b1);
        broadcast_to_group(bodies, groups, b2);
        resolved += 1;
    }
    resolved
}

/// Copy `member`'s post-impulse velocities onto every body in its group
/// and flag them all as collided.
fn broadcast_to_group(
    bodies: &mut [RigidBody],
    groups: &BTreeMap<usize, Vec<usize>>,
    member: usize,
) {
    let Some(group) = bodies[member].group else {
        return;
    };
    let Some(members) = groups.get(&group) else {
        return;
    };
    let velocity = bodies[member].velocity;
    let angular_velocity = bodies[member].angular_velocity;
    for &k in members {
        if k >= bodies.len() || !bodies[k].valid {
            continue;
        }
        bodies[k].velocity = velocity;
        bodies[k].angular_velocity = angular_velocity;
        bodies[k].collided = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::{BodyDescriptor, BodyKind};
    use glam::Vec3;

    fn free_body(mass_density: f32, position: Vec3, velocity: Vec3) -> RigidBody {
        let mut body =
            RigidBody::new(&BodyDescriptor::new(1.0, BodyKind::Block).with_density(mass_density))
                .unwrap();
        body.position = position;
        body.velocity = velocity;
        body.velocity_body = velocity;
        body
    }

    fn head_on_contact(b1: usize, b2: usize, vr: Vec3, n: Vec3, point: Vec3) -> Contact {
        Contact {
            body_a: b1,
            body_b: b2,
            point,
            normal: n,
            relative_velocity: vr,
            tangent: Vec3::ZERO,
        }
    }

    #[test]
    fn test_elastic_head_on_impulse_conserves_momentum() {
        let mut bodies = vec![
            free_body(2.0, Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)),
            free_body(3.0, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        ];
        let before = bodies[0].mass * bodies[0].velocity + bodies[1].mass * bodies[1].velocity;

        // Central contact: r x n = 0, pure linear exchange.
        let contact = head_on_contact(
            0,
            1,
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0) + Vec3::ZERO,
        );
        let groups = BTreeMap::new();
        let resolved = resolve_collisions(&mut bodies, &[contact], &groups, 1.0, 0.0);
        assert_eq!(resolved, 1);

        let after = bodies[0].mass * bodies[0].velocity + bodies[1].mass * bodies[1].velocity;
        assert!(
            (before - after).length() < 1e-4,
            "momentum must be conserved: before {:?}, after {:?}",
            before,
            after
        );
        assert!(bodies[0].velocity.x < 0.5, "striker slows down");
        assert!(bodies[1].velocity.x > 0.0, "struck body speeds up");
    }

    #[test]
    fn test_wall_receives_no_velocity_change() {
        let mut bodies = vec![
            free_body(2.0, Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)),
            free_body(3.0, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        ];
        bodies[1].kind = BodyKind::Wall;

        let contact = head_on_contact(
            0,
            1,
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
        );
        let groups = BTreeMap::new();
        resolve_collisions(&mut bodies, &[contact], &groups, 0.5, 0.0);

        assert_eq!(bodies[1].velocity, Vec3::ZERO);
        assert!(bodies[0].velocity.x < 0.0, "striker bounces off the wall");
    }

    #[test]
    fn test_two_immovables_skip_without_panic() {
        let mut bodies = vec![
            free_body(2.0, Vec3::ZERO, Vec3::ZERO),
            free_body(3.0, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        ];
        bodies[0].kind = BodyKind::FixedBlock;
        bodies[1].kind = BodyKind::Wall;

        let contact = head_on_contact(
            0,
            1,
            Vec3::new(0.1, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
        );
        let groups = BTreeMap::new();
        let resolved = resolve_collisions(&mut bodies, &[contact], &groups, 0.5, 0.9);
        assert_eq!(resolved, 0, "immovable pair must be a silent no-op");
        assert_eq!(bodies[0].velocity, Vec3::ZERO);
        assert_eq!(bodies[1].velocity, Vec3::ZERO);
    }

    #[test]
    fn test_group_members_inherit_resolution_velocity() {
        let mut bodies = vec![
            free_body(2.0, Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)),
            free_body(2.0, Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)),
            free_body(3.0, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        ];
        bodies[0].group = Some(0);
        bodies[1].group = Some(0);
        let mut groups = BTreeMap::new();
        groups.insert(0, vec![0, 1]);

        let contact = head_on_contact(
            0,
            2,
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
        );
        resolve_collisions(&mut bodies, &[contact], &groups, 0.5, 0.0);

        assert_eq!(bodies[0].velocity, bodies[1].velocity);
        assert_eq!(bodies[0].angular_velocity, bodies[1].angular_velocity);
        assert!(bodies[1].collided, "whole group is flagged on impact");
    }
}
