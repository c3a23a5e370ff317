//! Serializable kinematic snapshots.
//!
//! The multiplayer layer keeps arenas in sync by shipping per-body
//! kinematic state between the master and slave games. A
//! [`BodySnapshot`] is exactly that payload: position, velocities and
//! orientation, nothing derived and nothing structural (mass, size and
//! kind are established at level setup on both sides).

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::body::RigidBody;

/// The kinematic state of one body, fit for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub orientation: Quat,
}

impl BodySnapshot {
    /// Capture a body's current kinematic state.
    pub fn of(body: &RigidBody) -> Self {
        Self {
            position: body.position,
            velocity: body.velocity,
            angular_velocity: body.angular_velocity,
            orientation: body.orientation,
        }
    }

    /// Overwrite a body's kinematic state, recomputing the cached
    /// body-frame velocity and speed so the next narrow phase sees
    /// consistent values.
    pub fn apply(&self, body: &mut RigidBody) {
        body.position = self.position;
        body.velocity = self.velocity;
        body.angular_velocity = self.angular_velocity;
        body.orientation = self.orientation;
        body.velocity_body = body.orientation.conjugate() * body.velocity;
        body.speed = body.velocity.length();
    }
}
