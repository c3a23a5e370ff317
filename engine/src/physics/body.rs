//! Rigid body state, body kinds and tuning constants.
//!
//! Every physical object in the arena - walls, fixed blocks, floating
//! blocks, ship and monster bounding boxes - is one [`RigidBody`]: a
//! cuboid with mass, a diagonal inertia tensor, a unit orientation
//! quaternion and the 8 corners of its oriented box in body-local
//! coordinates. Bodies live in fixed registry slots and are pooled:
//! destruction marks a slot invalid, re-initialization revives it.

use glam::{Mat3, Quat, Vec3};
use static_assertions::const_assert;

use super::error::PhysicsError;

/// Registry capacity. Exceeding it at init time is a recoverable error.
pub const MAX_BODIES: usize = 200;

/// Narrow-phase distance tolerance for vertex-vs-face contact.
pub const COLLISION_TOLERANCE: f32 = 0.15;

/// Default mass density, in mass units per cubic arena unit.
///
/// Tuned so a cube of side `s` weighs `s^3 / 32.174`, the calibration the
/// arena's restitution and friction constants were chosen against.
pub const DEFAULT_DENSITY: f32 = 1.0 / 32.174;

/// Side length of a floating block.
pub const BLOCK_SIZE: f32 = 2.0;
/// Side length of a fixed block.
pub const FIXED_BLOCK_SIZE: f32 = 5.0;

/// Speed cap for walls and blocks.
pub const MAX_SPEED: f32 = 1.0;
/// Spin cap for walls and blocks.
pub const MAX_ANGULAR_SPEED: f32 = 0.2;
/// Speed floor for ship/monster bounding boxes; drifting actors are
/// pushed back up to this so the arena never accumulates near-stationary
/// clutter.
pub const MIN_ACTOR_SPEED: f32 = 0.2;
/// Speed cap for ship/monster bounding boxes.
pub const MAX_ACTOR_SPEED: f32 = 1.0;
/// Spin floor for ship/monster bounding boxes.
pub const MIN_ACTOR_ANGULAR_SPEED: f32 = 0.2;
/// Spin cap for ship/monster bounding boxes.
pub const MAX_ACTOR_ANGULAR_SPEED: f32 = 1.0;

const_assert!(MIN_ACTOR_SPEED <= MAX_ACTOR_SPEED);
const_assert!(MIN_ACTOR_ANGULAR_SPEED <= MAX_ACTOR_ANGULAR_SPEED);

/// What a body is, which governs how collisions treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Arena boundary. Immovable, never initiates a collision pair.
    Wall,
    /// Free-floating block.
    Block,
    /// Anchored block. Immovable, never initiates a collision pair.
    FixedBlock,
    /// One bounding sub-block of a player ship.
    ShipBlock,
    /// One bounding sub-block of a monster.
    MonsterBlock,
}

impl BodyKind {
    /// Immovable bodies never receive velocity changes and contribute
    /// zero inverse mass/inertia to the impulse denominator.
    pub fn is_immovable(self) -> bool {
        matches!(self, BodyKind::Wall | BodyKind::FixedBlock)
    }

    /// Whether this kind is a ship or monster bounding box (the kinds
    /// with a speed floor as well as a cap).
    pub fn is_actor(self) -> bool {
        matches!(self, BodyKind::ShipBlock | BodyKind::MonsterBlock)
    }

    /// Linear speed bounds as `(floor, cap)`; `floor` is `None` for
    /// kinds allowed to come to rest.
    pub fn linear_speed_bounds(self) -> (Option<f32>, f32) {
        if self.is_actor() {
            (Some(MIN_ACTOR_SPEED), MAX_ACTOR_SPEED)
        } else {
            (None, MAX_SPEED)
        }
    }

    /// Angular speed bounds as `(floor, cap)`.
    pub fn angular_speed_bounds(self) -> (Option<f32>, f32) {
        if self.is_actor() {
            (Some(MIN_ACTOR_ANGULAR_SPEED), MAX_ACTOR_ANGULAR_SPEED)
        } else {
            (None, MAX_ANGULAR_SPEED)
        }
    }
}

/// Parameters for creating (or re-initializing) a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDescriptor {
    /// Cube side length in arena units. Must be finite and positive.
    pub size: f32,
    /// Body kind; fixes movability and speed clamp policy.
    pub kind: BodyKind,
    /// Rigid group this body belongs to: the registry index of the
    /// group's leader. `None` for ungrouped bodies. A group's leader
    /// carries its own index here.
    pub group: Option<usize>,
    /// Mass density. Must be finite and positive.
    pub density: f32,
}

impl BodyDescriptor {
    /// Descriptor for an ungrouped body of the default density.
    pub fn new(size: f32, kind: BodyKind) -> Self {
        Self {
            size,
            kind,
            group: None,
            density: DEFAULT_DENSITY,
        }
    }

    /// Attach the body to the rigid group led by `leader`.
    pub fn with_group(mut self, leader: usize) -> Self {
        self.group = Some(leader);
        self
    }

    /// Override the mass density.
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

/// One rigid body in the registry.
///
/// Kinematic state is mutated in place by the integrator and resolver
/// each step; `collided`/`collided_with` are scratch fields the detector
/// sets for game logic to read after the step.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// Whether this registry slot is active. Invalid bodies are skipped
    /// by every pass.
    pub valid: bool,
    /// Total mass (constant for the body's lifetime).
    pub mass: f32,
    /// Mass moment of inertia in body coordinates (constant, diagonal).
    pub inertia: Mat3,
    /// Inverse of the inertia tensor (constant).
    pub inverse_inertia: Mat3,

    /// Position of the center of gravity in world coordinates.
    pub position: Vec3,
    /// Velocity in world coordinates.
    pub velocity: Vec3,
    /// Velocity in body coordinates.
    pub velocity_body: Vec3,
    /// Acceleration of the CG in world coordinates.
    pub acceleration: Vec3,
    /// Angular acceleration in body coordinates.
    pub angular_acceleration: Vec3,
    /// Angular velocity in body coordinates.
    pub angular_velocity: Vec3,
    /// Cached roll/pitch/yaw, for display and debugging only.
    pub euler_angles: Vec3,
    /// Cached magnitude of `velocity`.
    pub speed: f32,

    /// Orientation in world coordinates. Unit magnitude after every
    /// integration step.
    pub orientation: Quat,

    /// Net force accumulated this step, reset every step.
    pub forces: Vec3,
    /// Net moment (torque) accumulated this step, reset every step.
    pub moments: Vec3,

    /// Bounding sphere radius for the broad phase.
    pub bounding_radius: f32,
    /// The 8 corners of the bounding box relative to the CG, fixed at
    /// construction.
    pub vertices: [Vec3; 8],
    /// Body kind.
    pub kind: BodyKind,
    /// Registry index of the group leader, or `None` if ungrouped.
    pub group: Option<usize>,
    /// When set, collision detection against any body of this group is
    /// suppressed (used while a monster has seized a target).
    pub exempt_group: Option<usize>,
    /// Set by the detector when this body collided this step.
    pub collided: bool,
    /// Who this body collided with, if anyone, this step.
    pub collided_with: Option<usize>,
}

impl RigidBody {
    /// Build a body at rest at the origin from a descriptor.
    ///
    /// Mass is density x volume; the inertia tensor is the diagonal cube
    /// tensor `m * s^2 / 6` per axis; the bounding radius is the cube's
    /// half diagonal. Identical descriptors produce bit-identical bodies.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::InvalidBodyDescriptor`] when size or density is
    /// non-finite or non-positive (the inertia tensor would be singular).
    pub fn new(desc: &BodyDescriptor) -> Result<Self, PhysicsError> {
        if !desc.size.is_finite()
            || desc.size <= 0.0
            || !desc.density.is_finite()
            || desc.density <= 0.0
        {
            return Err(PhysicsError::InvalidBodyDescriptor);
        }

        let size = desc.size;
        let mass = desc.density * size * size * size;

        let moment = mass / 12.0 * (size * size + size * size);
        let inertia = Mat3::from_diagonal(Vec3::splat(moment));
        let inverse_inertia = Mat3::from_diagonal(Vec3::splat(1.0 / moment));

        let h = size / 2.0;
        // Corner order is load-bearing: the narrow-phase face table in
        // geometry.rs indexes into it.
        let vertices = [
            Vec3::new(h, h, -h),
            Vec3::new(h, h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, -h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, h, h),
            Vec3::new(-h, -h, h),
            Vec3::new(-h, -h, -h),
        ];

        Ok(Self {
            valid: true,
            mass,
            inertia,
            inverse_inertia,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            velocity_body: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            angular_acceleration: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            euler_angles: Vec3::ZERO,
            speed: 0.0,
            orientation: Quat::IDENTITY,
            forces: Vec3::ZERO,
            moments: Vec3::ZERO,
            bounding_radius: size * (3.0_f32.sqrt() / 2.0),
            vertices,
            kind: desc.kind,
            group: desc.group,
            exempt_group: None,
            collided: false,
            collided_with: None,
        })
    }

    /// An invalid filler body for registry slots that have never been
    /// initialized (created when a caller picks a slot beyond the
    /// current registry length). Benign unit mass/inertia so nothing
    /// divides by zero if one is ever inspected.
    pub(crate) fn pooled_placeholder() -> Self {
        let mut body = Self::new(&BodyDescriptor::new(1.0, BodyKind::Block))
            .expect("unit descriptor is always valid");
        body.valid = false;
        body
    }

    /// Inverse mass as seen by the impulse denominator: zero for
    /// immovable kinds, `1/mass` otherwise.
    pub fn effective_inverse_mass(&self) -> f32 {
        if self.kind.is_immovable() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Inverse inertia as seen by the impulse denominator: the zero
    /// matrix for immovable kinds.
    pub fn effective_inverse_inertia(&self) -> Mat3 {
        if self.kind.is_immovable() {
            Mat3::ZERO
        } else {
            self.inverse_inertia
        }
    }

    /// The body's 8 box corners rotated and translated into world space.
    pub fn world_vertices(&self) -> [Vec3; 8] {
        self.vertices
            .map(|v| self.orientation * v + self.position)
    }
}
