//! Semi-implicit Euler integration and rigid-group propagation.
//!
//! Integration advances every valid body's linear and angular state by
//! one caller-supplied timestep, clamps speeds to per-kind bounds, and
//! renormalizes the orientation quaternion. Afterwards every rigid group
//! is made uniform again: each member mirrors its leader's full
//! kinematic state, so a group is a rigid composite driven entirely by
//! its leader.

use std::collections::BTreeMap;

use glam::{EulerRot, Quat, Vec3};

use super::body::RigidBody;

/// Reset per-step force and moment accumulators on all valid bodies.
///
/// There is no persistent external force in this system (gravity is a
/// frame-to-frame speed tuning in the game layer, not a force), so this
/// nets to zero; it exists so callers can inject forces between steps.
pub(crate) fn clear_forces(bodies: &mut [RigidBody]) {
    for body in bodies.iter_mut().filter(|b| b.valid) {
        body.forces = Vec3::ZERO;
        body.moments = Vec3::ZERO;
    }
}

/// Advance every valid body by `dt` seconds.
///
/// Order per body: linear acceleration from forces, velocity update and
/// clamp, position update, Euler's rotation equation for angular
/// acceleration (including the gyroscopic coupling term), angular
/// velocity update and clamp, quaternion derivative integration and
/// renormalization, then the cached body-frame velocity, speed and Euler
/// angles. Collision scratch fields are reset here so the detector that
/// runs next starts from a clean slate.
pub(crate) fn integrate(bodies: &mut [RigidBody], dt: f32) {
    for body in bodies.iter_mut() {
        if !body.valid {
            continue;
        }
        body.collided = false;
        body.collided_with = None;

        // Linear half: a = F/m, semi-implicit Euler.
        body.acceleration = body.forces / body.mass;
        body.velocity += body.acceleration * dt;
        let (floor, cap) = body.kind.linear_speed_bounds();
        body.velocity = clamp_magnitude(body.velocity, floor, cap);
        body.position += body.velocity * dt;

        // Angular half: Euler's rigid-body rotation equation.
        body.angular_acceleration = body.inverse_inertia
            * (body.moments - body.angular_velocity.cross(body.inertia * body.angular_velocity));
        body.angular_velocity += body.angular_acceleration * dt;
        let (floor, cap) = body.kind.angular_speed_bounds();
        body.angular_velocity = clamp_magnitude(body.angular_velocity, floor, cap);

        // Quaternion derivative with angular velocity as a pure
        // quaternion: q' = q + (q x w) * dt/2, renormalized.
        let w = body.angular_velocity;
        let dq = body.orientation * Quat::from_xyzw(w.x, w.y, w.z, 0.0);
        let q = body.orientation + dq * (0.5 * dt);
        let mag = q.length();
        body.orientation = if mag != 0.0 { q / mag } else { q };

        // Derived state the detector and the game layer read back.
        body.velocity_body = body.orientation.conjugate() * body.velocity;
        body.speed = body.velocity.length();
        let (yaw, pitch, roll) = body.orientation.to_euler(EulerRot::ZYX);
        body.euler_angles = Vec3::new(roll, pitch, yaw);
    }
}

/// Mirror every group leader's post-integration state onto its members.
///
/// Groups are visited in ascending leader order, so the pass is
/// deterministic. Invalid leaders suspend their whole group; invalid
/// members are skipped individually (pooled slots awaiting revival). A
/// leader slot recycled into a body outside the group also suspends the
/// group: the occupant only drives the members while its own `group`
/// field still names it as leader.
pub(crate) fn propagate_groups(bodies: &mut [RigidBody], groups: &BTreeMap<usize, Vec<usize>>) {
    for (&leader, members) in groups {
        if leader >= bodies.len() || !bodies[leader].valid {
            continue;
        }
        if bodies[leader].group != Some(leader) {
            continue;
        }
        let src = bodies[leader].clone();
        for &k in members {
            if k == leader || k >= bodies.len() || !bodies[k].valid {
                continue;
            }
            let body = &mut bodies[k];
            body.acceleration = src.acceleration;
            body.velocity = src.velocity;
            body.position = src.position;
            body.angular_acceleration = src.angular_acceleration;
            body.angular_velocity = src.angular_velocity;
            body.orientation = src.orientation;
            body.velocity_body = src.velocity_body;
            body.speed = src.speed;
            body.euler_angles = src.euler_angles;
        }
    }
}

/// Rescale `v` so its magnitude lies within the given bounds.
///
/// Rescales the whole vector to the bound rather than clamping
/// components, preserving direction. A zero vector has no direction to
/// rescale along, so the floor leaves it untouched.
fn clamp_magnitude(v: Vec3, floor: Option<f32>, cap: f32) -> Vec3 {
    let mag = v.length();
    if mag > cap {
        return v * (cap / mag);
    }
    if let Some(floor) = floor {
        if mag < floor && mag > 1e-8 {
            return v * (floor / mag);
        }
    }
    v
}
