//! Physics module for the Spaceblocks engine
//!
//! Custom rigid-body implementation for the block arena. Built from
//! scratch on glam math, no external physics library.
//!
//! The simulation is strictly single-threaded and frame-driven: one call
//! to [`PhysicsWorld::step_simulation`] per rendered frame runs
//! clear forces -> integrate -> propagate groups -> detect -> resolve.
//! Collision detection is a brute-force O(n^2) pair scan with a bounding
//! sphere broad phase and a vertex-vs-face narrow phase against oriented
//! boxes. Resolution is sequential impulses with restitution and
//! friction; later contacts see the velocity changes of earlier ones.
//!
//! # Unit System
//!
//! Distances are in arena units,
//! velocities in units per step-second. All math is single-precision.
//!
//! # Submodules
//!
//! - [`types`] - Core mathematical types (Vec3, Quat, Mat3) re-exported from glam
//! - [`body`] - Body kinds, rigid body state, descriptors and tuning constants
//! - [`geometry`] - Point/plane/face tests shared by the narrow phase
//! - [`collision`] - Broad + narrow phase detection producing contact records
//! - [`resolver`] - Impulse-based collision response
//! - [`integrator`] - Semi-implicit Euler integration and group propagation
//! - [`world`] - The owned body registry and the public simulation API
//! - [`timestep`] - Frame-rate compensation for the caller-supplied dt
//! - [`snapshot`] - Serializable kinematic state for network sync
//! - [`error`] - Error taxonomy

pub mod body;
pub mod collision;
pub mod error;
pub mod geometry;
pub mod integrator;
pub mod resolver;
pub mod snapshot;
pub mod timestep;
pub mod types;
pub mod world;

// Re-export commonly used types at the physics module level
pub use body::{
    BodyDescriptor, BodyKind, RigidBody, COLLISION_TOLERANCE, DEFAULT_DENSITY, MAX_BODIES,
};
pub use collision::Contact;
pub use error::PhysicsError;
pub use snapshot::BodySnapshot;
pub use timestep::{FrameRate, DEFAULT_STEP_SCALE};
pub use types::{Mat3, Quat, Vec3};
pub use world::{PhysicsWorld, SimulationConfig};
