//! Spaceblocks Physics Library
//!
//! A custom rigid-body collision engine for the Spaceblocks arena game:
//! many simultaneously moving cuboid bodies (arena walls, fixed and
//! floating blocks, ship and monster bounding boxes) with discrete
//! collision detection and impulse-based resolution.
//!
//! # Modules
//!
//! - [`physics`] - Body registry, integration, collision detection and
//!   impulse resolution, frame-rate compensated stepping, state snapshots
//!
//! # Example
//!
//! ```ignore
//! use spaceblocks_physics::physics::{
//!     PhysicsWorld, BodyDescriptor, BodyKind, FrameRate, DEFAULT_STEP_SCALE,
//! };
//! use glam::Vec3;
//!
//! let mut world = PhysicsWorld::new();
//! let block = world.init_body(&BodyDescriptor::new(2.0, BodyKind::Block))?;
//! world.set_velocity(block, Vec3::new(0.3, 0.0, 0.0))?;
//!
//! let mut frame_rate = FrameRate::new(30.0);
//! loop {
//!     frame_rate.tick();
//!     world.step_simulation(frame_rate.step_scale() * DEFAULT_STEP_SCALE);
//!     if world.collided(block) {
//!         // game logic reacts: explosions, damage, sound
//!     }
//! }
//! ```

pub mod physics;
