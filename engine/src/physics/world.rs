//! The owned body registry and the public simulation API.
//!
//! [`PhysicsWorld`] owns the body slots, the reusable contact buffer and
//! the rigid-group index. It is passed explicitly rather than living in
//! globals, so tests (and a potential second arena) can run independent
//! simulations.
//!
//! # Example
//!
//! ```ignore
//! use spaceblocks_physics::physics::{PhysicsWorld, BodyDescriptor, BodyKind};
//! use glam::Vec3;
//!
//! let mut world = PhysicsWorld::new();
//! let block = world.init_body(&BodyDescriptor::new(2.0, BodyKind::Block))?;
//! world.set_position(block, Vec3::new(0.0, 0.0, -10.0))?;
//! world.set_velocity(block, Vec3::new(0.2, 0.0, 0.0))?;
//! world.step_simulation(0.1);
//! if let Some(other) = world.collided_with(block) {
//!     println!("block {} hit body {}", block, other);
//! }
//! ```

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use tracing::debug;

use super::body::{BodyDescriptor, RigidBody, COLLISION_TOLERANCE, MAX_BODIES};
use super::collision::{self, Contact};
use super::error::PhysicsError;
use super::integrator;
use super::resolver;
use super::snapshot::BodySnapshot;

/// Tuning constants for detection and resolution, overridable per world
/// (tests use perfectly elastic, frictionless configs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Coefficient of restitution: fraction of relative normal velocity
    /// reversed by a collision. 1.0 is perfectly elastic.
    pub restitution: f32,
    /// Friction coefficient scaling the tangential impulse.
    pub friction: f32,
    /// Narrow-phase vertex-to-face distance tolerance.
    pub collision_tolerance: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            restitution: 0.5,
            friction: 0.9,
            collision_tolerance: COLLISION_TOLERANCE,
        }
    }
}

/// A self-contained rigid-body simulation.
///
/// Bodies occupy stable integer slots: a slot index never changes for a
/// body's lifetime, destruction marks it invalid, and re-initialization
/// revives it in place (object pooling). Group membership is tracked in
/// a leader-keyed index rebuilt incrementally as bodies are created.
#[derive(Debug, Clone, Default)]
pub struct PhysicsWorld {
    bodies: Vec<RigidBody>,
    contacts: Vec<Contact>,
    groups: BTreeMap<usize, Vec<usize>>,
    config: SimulationConfig,
}

impl PhysicsWorld {
    /// Empty world with the default arena tuning.
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Empty world with custom tuning.
    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            bodies: Vec::with_capacity(MAX_BODIES),
            contacts: Vec::new(),
            groups: BTreeMap::new(),
            config,
        }
    }

    /// Number of registry slots in use (valid or pooled).
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Whether `index` refers to a valid body.
    pub fn is_valid(&self, index: usize) -> bool {
        self.bodies.get(index).is_some_and(|b| b.valid)
    }

    /// Create a body in the first free slot (an invalidated slot is
    /// reused before the registry grows).
    ///
    /// # Errors
    ///
    /// [`PhysicsError::InvalidBodyDescriptor`] for degenerate
    /// descriptors, [`PhysicsError::CapacityExceeded`] when all
    /// [`MAX_BODIES`] slots hold valid bodies.
    pub fn init_body(&mut self, desc: &BodyDescriptor) -> Result<usize, PhysicsError> {
        let slot = self
            .bodies
            .iter()
            .position(|b| !b.valid)
            .unwrap_or(self.bodies.len());
        self.init_body_at(slot, desc)
    }

    /// Create (or re-initialize) a body in a caller-chosen slot.
    ///
    /// Group leadership makes slot choice meaningful: a group's id is
    /// its leader's index, so composites are laid out by the caller.
    /// Re-running this on an existing slot with identical parameters
    /// produces bit-identical body state.
    pub fn init_body_at(
        &mut self,
        index: usize,
        desc: &BodyDescriptor,
    ) -> Result<usize, PhysicsError> {
        if index >= MAX_BODIES {
            return Err(PhysicsError::CapacityExceeded);
        }
        let body = RigidBody::new(desc)?;

        while self.bodies.len() <= index {
            self.bodies.push(RigidBody::pooled_placeholder());
        }

        // A reused slot may carry stale group membership.
        if let Some(old_group) = self.bodies[index].group {
            if self.bodies[index].group != desc.group {
                if let Some(members) = self.groups.get_mut(&old_group) {
                    members.retain(|&m| m != index);
                }
            }
        }
        if let Some(group) = desc.group {
            let members = self.groups.entry(group).or_default();
            if !members.contains(&index) {
                members.push(index);
                members.sort_unstable();
            }
        }

        self.bodies[index] = body;
        Ok(index)
    }

    /// Mark a body destroyed. The slot stays allocated for reuse.
    pub fn invalidate(&mut self, index: usize) -> Result<(), PhysicsError> {
        let body = self.get_mut(index)?;
        body.valid = false;
        Ok(())
    }

    /// Advance the simulation by one step of `dt` seconds: clear forces,
    /// integrate all bodies, make groups uniform, detect collisions and
    /// resolve them. Returns the number of contacts resolved; the
    /// per-body `collided`/`collided_with` fields are left set for the
    /// caller to interpret.
    pub fn step_simulation(&mut self, dt: f32) -> usize {
        integrator::clear_forces(&mut self.bodies);
        integrator::integrate(&mut self.bodies, dt);
        integrator::propagate_groups(&mut self.bodies, &self.groups);

        let any = collision::detect_collisions(
            &mut self.bodies,
            self.config.collision_tolerance,
            &mut self.contacts,
        );
        if !any {
            return 0;
        }

        let resolved = resolver::resolve_collisions(
            &mut self.bodies,
            &self.contacts,
            &self.groups,
            self.config.restitution,
            self.config.friction,
        );
        debug!(contacts = self.contacts.len(), resolved, "collision step");
        resolved
    }

    /// Narrow-phase probe of exactly one pair, bypassing the broad phase
    /// and exemption rules. Used by grasp/reach logic to test a
    /// hypothetical configuration without running a full step; world
    /// state is not modified.
    pub fn check_pair_collision(
        &self,
        body_a: usize,
        body_b: usize,
        tolerance: f32,
    ) -> Result<bool, PhysicsError> {
        self.get(body_a)?;
        self.get(body_b)?;
        let mut scratch = Vec::new();
        Ok(collision::check_box_collision(
            &self.bodies,
            body_a,
            body_b,
            tolerance,
            &mut scratch,
        ))
    }

    /// Borrow a valid body.
    pub fn body(&self, index: usize) -> Result<&RigidBody, PhysicsError> {
        self.get(index)
    }

    /// The contacts found by the most recent step, in detection order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn position(&self, index: usize) -> Result<Vec3, PhysicsError> {
        Ok(self.get(index)?.position)
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) -> Result<(), PhysicsError> {
        self.get_mut(index)?.position = position;
        Ok(())
    }

    pub fn velocity(&self, index: usize) -> Result<Vec3, PhysicsError> {
        Ok(self.get(index)?.velocity)
    }

    /// Set the world-frame velocity, keeping the cached body-frame
    /// velocity and speed consistent.
    pub fn set_velocity(&mut self, index: usize, velocity: Vec3) -> Result<(), PhysicsError> {
        let body = self.get_mut(index)?;
        body.velocity = velocity;
        body.velocity_body = body.orientation.conjugate() * velocity;
        body.speed = velocity.length();
        Ok(())
    }

    pub fn angular_velocity(&self, index: usize) -> Result<Vec3, PhysicsError> {
        Ok(self.get(index)?.angular_velocity)
    }

    pub fn set_angular_velocity(
        &mut self,
        index: usize,
        angular_velocity: Vec3,
    ) -> Result<(), PhysicsError> {
        self.get_mut(index)?.angular_velocity = angular_velocity;
        Ok(())
    }

    pub fn orientation(&self, index: usize) -> Result<Quat, PhysicsError> {
        Ok(self.get(index)?.orientation)
    }

    pub fn set_orientation(&mut self, index: usize, orientation: Quat) -> Result<(), PhysicsError> {
        let body = self.get_mut(index)?;
        body.orientation = orientation.normalize();
        body.velocity_body = body.orientation.conjugate() * body.velocity;
        Ok(())
    }

    /// Set the orientation from an axis-angle pair (the rendering layer
    /// speaks axis+angle).
    pub fn set_orientation_axis_angle(
        &mut self,
        index: usize,
        axis: Vec3,
        angle: f32,
    ) -> Result<(), PhysicsError> {
        self.set_orientation(index, Quat::from_axis_angle(axis.normalize(), angle))
    }

    /// The body's +x axis in world space (ship heading).
    pub fn body_x_axis(&self, index: usize) -> Result<Vec3, PhysicsError> {
        Ok(self.get(index)?.orientation * Vec3::X)
    }

    /// The body's +z axis in world space.
    pub fn body_z_axis(&self, index: usize) -> Result<Vec3, PhysicsError> {
        Ok(self.get(index)?.orientation * Vec3::Z)
    }

    /// The rigid group this body belongs to (its leader's index), if any.
    /// Membership is fixed at init time; regroup a body by
    /// re-initializing its slot.
    pub fn group(&self, index: usize) -> Result<Option<usize>, PhysicsError> {
        Ok(self.get(index)?.group)
    }

    /// Suppress collision detection between this body and every body of
    /// the group led by `group` (a monster grasping its target must not
    /// re-collide with it).
    pub fn set_exemption(&mut self, index: usize, group: usize) -> Result<(), PhysicsError> {
        self.get_mut(index)?.exempt_group = Some(group);
        Ok(())
    }

    /// Remove this body's exemption.
    pub fn clear_exemption(&mut self, index: usize) -> Result<(), PhysicsError> {
        self.get_mut(index)?.exempt_group = None;
        Ok(())
    }

    /// Whether the body collided during the most recent step. False for
    /// unknown or invalid bodies.
    pub fn collided(&self, index: usize) -> bool {
        self.get(index).map(|b| b.collided).unwrap_or(false)
    }

    /// Who the body collided with during the most recent step, if
    /// anyone. For ship blocks this prefers non-monster colliders.
    pub fn collided_with(&self, index: usize) -> Option<usize> {
        self.get(index).ok().and_then(|b| b.collided_with)
    }

    /// Kinematic snapshot for network sync.
    pub fn snapshot(&self, index: usize) -> Result<BodySnapshot, PhysicsError> {
        Ok(BodySnapshot::of(self.get(index)?))
    }

    /// Overwrite a body's kinematic state from a snapshot (slave side of
    /// the network sync).
    pub fn apply_snapshot(
        &mut self,
        index: usize,
        snapshot: &BodySnapshot,
    ) -> Result<(), PhysicsError> {
        snapshot.apply(self.get_mut(index)?);
        Ok(())
    }

    fn get(&self, index: usize) -> Result<&RigidBody, PhysicsError> {
        self.bodies
            .get(index)
            .filter(|b| b.valid)
            .ok_or(PhysicsError::NoSuchBody(index))
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies
            .get_mut(index)
            .filter(|b| b.valid)
            .ok_or(PhysicsError::NoSuchBody(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyKind;

    #[test]
    fn test_init_body_reuses_invalidated_slot() {
        let mut world = PhysicsWorld::new();
        let a = world.init_body(&BodyDescriptor::new(1.0, BodyKind::Block)).unwrap();
        let b = world.init_body(&BodyDescriptor::new(1.0, BodyKind::Block)).unwrap();
        assert_eq!((a, b), (0, 1));

        world.invalidate(a).unwrap();
        assert!(!world.is_valid(a));

        let c = world.init_body(&BodyDescriptor::new(2.0, BodyKind::Block)).unwrap();
        assert_eq!(c, a, "pooled slot is revived before the registry grows");
        assert!(world.is_valid(c));
        assert_eq!(world.body_count(), 2);
    }

    #[test]
    fn test_init_body_at_is_idempotent() {
        let mut world = PhysicsWorld::new();
        let desc = BodyDescriptor::new(2.0, BodyKind::ShipBlock).with_group(3);
        world.init_body_at(3, &desc).unwrap();
        let first = world.body(3).unwrap().clone();
        world.init_body_at(3, &desc).unwrap();
        assert_eq!(*world.body(3).unwrap(), first);
    }

    #[test]
    fn test_registry_capacity_is_enforced() {
        let mut world = PhysicsWorld::new();
        assert_eq!(
            world.init_body_at(MAX_BODIES, &BodyDescriptor::new(1.0, BodyKind::Block)),
            Err(PhysicsError::CapacityExceeded)
        );
    }

    #[test]
    fn test_accessors_reject_invalid_bodies() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.position(0), Err(PhysicsError::NoSuchBody(0)));
        let a = world.init_body(&BodyDescriptor::new(1.0, BodyKind::Block)).unwrap();
        world.invalidate(a).unwrap();
        assert_eq!(world.velocity(a), Err(PhysicsError::NoSuchBody(a)));
        assert!(!world.collided(a));
    }

    #[test]
    fn test_set_velocity_updates_derived_state() {
        let mut world = PhysicsWorld::new();
        let a = world.init_body(&BodyDescriptor::new(1.0, BodyKind::Block)).unwrap();
        world.set_velocity(a, Vec3::new(0.3, 0.0, 0.4)).unwrap();
        let body = world.body(a).unwrap();
        assert!((body.speed - 0.5).abs() < 1e-6);
        assert_eq!(body.velocity_body, body.velocity); // identity orientation
    }

    #[test]
    fn test_regrouping_a_pooled_slot_updates_the_index() {
        let mut world = PhysicsWorld::new();
        world
            .init_body_at(0, &BodyDescriptor::new(1.0, BodyKind::ShipBlock).with_group(0))
            .unwrap();
        world
            .init_body_at(1, &BodyDescriptor::new(1.0, BodyKind::ShipBlock).with_group(0))
            .unwrap();

        // Slot 1 is recycled into a different group.
        world
            .init_body_at(1, &BodyDescriptor::new(1.0, BodyKind::MonsterBlock).with_group(1))
            .unwrap();
        world.set_velocity(0, Vec3::new(0.5, 0.0, 0.0)).unwrap();
        world.step_simulation(0.1);

        // Body 1 no longer mirrors group 0's leader.
        assert_ne!(world.velocity(0).unwrap(), world.velocity(1).unwrap());
    }

    #[test]
    fn test_recycled_leader_slot_does_not_drive_orphaned_members() {
        let mut world = PhysicsWorld::new();
        world
            .init_body_at(0, &BodyDescriptor::new(1.0, BodyKind::ShipBlock).with_group(0))
            .unwrap();
        world
            .init_body_at(1, &BodyDescriptor::new(1.0, BodyKind::ShipBlock).with_group(0))
            .unwrap();

        // The leader dies and its slot is recycled into an unrelated
        // ungrouped block elsewhere in the arena.
        world.invalidate(0).unwrap();
        let recycled = world.init_body(&BodyDescriptor::new(2.0, BodyKind::Block)).unwrap();
        assert_eq!(recycled, 0);
        world.set_position(recycled, Vec3::new(50.0, 0.0, 0.0)).unwrap();
        world.set_velocity(recycled, Vec3::new(0.9, 0.0, 0.0)).unwrap();

        world.step_simulation(0.1);

        // The orphaned member keeps its own state instead of mirroring
        // whatever now occupies its old leader's slot.
        assert_ne!(
            world.velocity(1).unwrap(),
            world.velocity(0).unwrap(),
            "orphaned member must not mirror the body recycled into its old leader slot"
        );
        assert_ne!(world.position(1).unwrap(), world.position(0).unwrap());
    }
}
