use crate::error::{PlatformError, Result};
use bevy_ecs::entity::Entity;
use bevy_ecs::prelude::Component;
use bevy_ecs::reflect::ReflectComponent;
use bevy_math::{Quat, Vec3};
use bevy_reflect::Reflect;
use bevy_transform::components::Transform;
use serde::{Deserialize, Serialize};

/// Marker for entities whose motion carries overlapping characters along (moving walkways, elevators..)
///
/// The world transform of the platform is read from its [`Transform`]; platforms are expected
/// to be root entities moved during `FixedUpdate`.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Platform;

/// World-space position and rotation of a platform
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Reflect)]
pub struct PlatformPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl PlatformPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Express a world-space point in the local frame of the platform
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    /// Express a local-frame point of the platform in world space
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

impl From<&Transform> for PlatformPose {
    fn from(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            rotation: transform.rotation,
        }
    }
}

/// Resolves a platform identity to its current world pose.
///
/// Returns [`PlatformError::PlatformNotFound`] if the platform does not exist anymore
/// (for example it was despawned); callers fall back to the last pose they cached.
pub trait PlatformLookup {
    fn pose(&self, platform: Entity) -> Result<PlatformPose>;
}

impl<F> PlatformLookup for F
where
    F: Fn(Entity) -> Option<PlatformPose>,
{
    fn pose(&self, platform: Entity) -> Result<PlatformPose> {
        self(platform).ok_or(PlatformError::PlatformNotFound(platform))
    }
}
