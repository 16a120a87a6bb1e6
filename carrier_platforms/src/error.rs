//! Platform tracking errors
//!
//! None of these errors are fatal: the processor absorbs every one of them with a fallback.
use alloc::string::String;
use bevy_ecs::entity::Entity;

pub type Result<T> = core::result::Result<T, PlatformError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    /// All the tracking slots are in use; the platform is not tracked
    #[error("all {capacity} platform slots are in use, cannot track platform {platform:?}")]
    CapacityExceeded { platform: Entity, capacity: usize },
    /// The platform could not be resolved to a live object (for example it was despawned)
    #[error("platform {0:?} could not be found")]
    PlatformNotFound(Entity),
    /// A transform-delta listener reported a failure
    #[error("platform delta listener failed: {0}")]
    Listener(String),
}
