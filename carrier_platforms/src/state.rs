//! Authoritative per-character platform state.
//!
//! The state is a fixed-size block of plain value records so that it can be replicated,
//! stored in a history buffer for rollback, and compared cheaply.
use crate::error::{PlatformError, Result};
use crate::platform::PlatformPose;
use bevy_ecs::entity::Entity;
use bevy_ecs::prelude::Component;
use bevy_ecs::reflect::ReflectComponent;
use bevy_math::{Quat, Vec3};
use bevy_reflect::Reflect;
use carrier_core::kinematic::KinematicState;
use serde::{Deserialize, Serialize};

/// Maximum number of platforms that can be tracked simultaneously by a character
pub const MAX_TRACKED_PLATFORMS: usize = 3;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PlatformLifecycle {
    /// The slot is free
    #[default]
    None,
    /// The character currently overlaps the platform
    Active,
    /// The character left the platform recently; the platform is blending out
    Inactive,
}

/// One platform tracked by a character
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct TrackedPlatform {
    /// Identity of the platform. [`Entity::PLACEHOLDER`] if the slot is free
    pub platform: Entity,
    pub lifecycle: PlatformLifecycle,
    /// How much of the character position is determined by the frame of this platform, in `[0, 1]`
    pub alpha: f32,
    /// Platform world position observed at the last step
    pub position: Vec3,
    /// Platform world rotation observed at the last step
    pub rotation: Quat,
    /// Character position in the local frame of the platform
    pub character_offset: Vec3,
    /// Character velocity in the local frame of the platform
    pub character_velocity: Vec3,
}

impl Default for TrackedPlatform {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl TrackedPlatform {
    pub const EMPTY: Self = Self {
        platform: Entity::PLACEHOLDER,
        lifecycle: PlatformLifecycle::None,
        alpha: 0.0,
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        character_offset: Vec3::ZERO,
        character_velocity: Vec3::ZERO,
    };

    /// Start tracking `platform`: the blend alpha starts at 0
    pub fn new(platform: Entity, pose: PlatformPose, character: &KinematicState) -> Self {
        let mut tracked = Self {
            platform,
            lifecycle: PlatformLifecycle::Active,
            ..Self::EMPTY
        };
        tracked.capture(pose, character);
        tracked
    }

    pub fn is_empty(&self) -> bool {
        self.lifecycle == PlatformLifecycle::None
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == PlatformLifecycle::Active
    }

    pub fn pose(&self) -> PlatformPose {
        PlatformPose::new(self.position, self.rotation)
    }

    /// World position of the character reconstructed from the platform frame
    pub fn character_position(&self) -> Vec3 {
        self.pose().to_world(self.character_offset)
    }

    /// World velocity of the character reconstructed from the platform frame
    pub fn character_world_velocity(&self) -> Vec3 {
        self.rotation * self.character_velocity
    }

    /// Store the platform pose and express the character state in its frame
    pub fn capture(&mut self, pose: PlatformPose, character: &KinematicState) {
        self.position = pose.position;
        self.rotation = pose.rotation;
        self.refresh_character(character);
    }

    /// Express the character state in the frame of the last stored platform pose
    pub fn refresh_character(&mut self, character: &KinematicState) {
        let pose = self.pose();
        self.character_offset = pose.to_local(character.position);
        self.character_velocity = pose.rotation.inverse() * character.velocity;
    }

    /// World-space displacement that the platform motion from the stored pose to `pose`
    /// applies to the character.
    ///
    /// This is the change of `position + rotation * character_offset`: the offset is rotated by the
    /// local rotation delta, and the offset difference is brought back to world space through the
    /// stored rotation (the frame the offset was measured in).
    pub fn carried_delta(&self, pose: &PlatformPose) -> Vec3 {
        let position_delta = pose.position - self.position;
        let rotation_delta = self.rotation.inverse() * pose.rotation;
        let offset_delta = rotation_delta * self.character_offset - self.character_offset;
        position_delta + self.rotation * offset_delta
    }

    /// World-space rotation applied by the platform motion from the stored pose to `pose`
    pub fn rotation_delta(&self, pose: &PlatformPose) -> Quat {
        (pose.rotation * self.rotation.inverse()).normalize()
    }
}

/// Platforms tracked by a character.
///
/// Replicated as authoritative simulation state.
#[derive(Component, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct TrackedPlatforms {
    slots: [TrackedPlatform; MAX_TRACKED_PLATFORMS],
}

impl Default for TrackedPlatforms {
    fn default() -> Self {
        Self {
            slots: [TrackedPlatform::EMPTY; MAX_TRACKED_PLATFORMS],
        }
    }
}

impl TrackedPlatforms {
    pub fn capacity(&self) -> usize {
        MAX_TRACKED_PLATFORMS
    }

    pub fn get(&self, index: usize) -> Option<&TrackedPlatform> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TrackedPlatform> {
        self.slots.get_mut(index)
    }

    /// Overwrite the slot at `index`. Out of range indices are ignored
    pub fn set(&mut self, index: usize, platform: TrackedPlatform) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = platform;
        }
    }

    /// Reset the slot at `index` to an empty slot
    pub fn free(&mut self, index: usize) {
        self.set(index, TrackedPlatform::EMPTY);
    }

    pub fn clear(&mut self) {
        self.slots = [TrackedPlatform::EMPTY; MAX_TRACKED_PLATFORMS];
    }

    /// All slots, including the free ones
    pub fn slots(&self) -> &[TrackedPlatform] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [TrackedPlatform] {
        &mut self.slots
    }

    /// Non-empty slots
    pub fn iter(&self) -> impl Iterator<Item = &TrackedPlatform> {
        self.slots.iter().filter(|slot| !slot.is_empty())
    }

    /// Index of the slot tracking `platform`
    pub fn find(&self, platform: Entity) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| !slot.is_empty() && slot.platform == platform)
    }

    pub fn tracked(&self, platform: Entity) -> Option<&TrackedPlatform> {
        self.find(platform).and_then(|index| self.slots.get(index))
    }

    /// Blend alpha of `platform`, 0 if it is not tracked
    pub fn alpha_of(&self, platform: Entity) -> f32 {
        self.tracked(platform).map_or(0.0, |slot| slot.alpha)
    }

    pub fn is_tracking(&self) -> bool {
        self.slots.iter().any(|slot| !slot.is_empty())
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    /// Sum of the blend alphas of all tracked platforms
    pub fn total_alpha(&self) -> f32 {
        self.iter().map(|slot| slot.alpha).sum()
    }

    /// Start tracking `platform` in the first free slot.
    ///
    /// There is no eviction: if every slot is in use, [`PlatformError::CapacityExceeded`] is returned.
    pub fn claim(
        &mut self,
        platform: Entity,
        pose: PlatformPose,
        character: &KinematicState,
    ) -> Result<usize> {
        let index = self
            .slots
            .iter()
            .position(TrackedPlatform::is_empty)
            .ok_or(PlatformError::CapacityExceeded {
                platform,
                capacity: MAX_TRACKED_PLATFORMS,
            })?;
        self.slots[index] = TrackedPlatform::new(platform, pose, character);
        Ok(index)
    }

    /// Express the character state in the frame of every tracked platform
    pub fn refresh_character(&mut self, character: &KinematicState) {
        for slot in self.slots.iter_mut().filter(|slot| !slot.is_empty()) {
            slot.refresh_character(character);
        }
    }

    /// Approximate equality used to detect mispredictions
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.slots.iter().zip(other.slots.iter()).all(|(a, b)| {
            a.platform == b.platform
                && a.lifecycle == b.lifecycle
                && (a.alpha - b.alpha).abs() <= epsilon
                && a.position.abs_diff_eq(b.position, epsilon)
                && a.rotation.abs_diff_eq(b.rotation, epsilon)
                && a.character_offset.abs_diff_eq(b.character_offset, epsilon)
                && a.character_velocity.abs_diff_eq(b.character_velocity, epsilon)
        })
    }
}
