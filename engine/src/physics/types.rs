//! Core math types for the physics system, re-exported from glam.

pub use glam::{EulerRot, Mat3, Quat, Vec3};
