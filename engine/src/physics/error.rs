//! Error taxonomy for the physics core.
//!
//! Physics errors are either prevented by validation at body creation
//! time or are non-fatal skips during stepping. Nothing here is retried;
//! the caller decides whether to disable further physics or log and
//! continue.

use std::fmt;

/// Errors reported by the physics core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    /// A body descriptor had a non-finite or non-positive size or
    /// density. The body was not created; the registry is unchanged.
    InvalidBodyDescriptor,
    /// The body registry is full ([`MAX_BODIES`](crate::physics::MAX_BODIES)
    /// slots). Contact storage grows dynamically and never raises this.
    CapacityExceeded,
    /// A body index was out of range or referred to an invalidated slot.
    NoSuchBody(usize),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::InvalidBodyDescriptor => {
                write!(f, "body descriptor has non-finite or non-positive size/density")
            }
            PhysicsError::CapacityExceeded => write!(f, "body registry is full"),
            PhysicsError::NoSuchBody(index) => write!(f, "no valid body at index {}", index),
        }
    }
}

impl std::error::Error for PhysicsError {}
