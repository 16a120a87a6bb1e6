//! Reconstruct the character state from platform space.
//!
//! Each tracked platform gives an estimate of the character position:
//! `platform_position + platform_rotation * character_offset`. The estimates are weighted by the
//! blend alpha of their platform, and the world-space state fills whatever weight is missing.
use crate::history::{PlatformSnapshot, SnapshotPair};
use crate::state::TrackedPlatforms;
use bevy_ecs::entity::Entity;
use bevy_math::Vec3;

fn blend(weighted: impl Iterator<Item = (Vec3, f32)>, world: Vec3) -> Vec3 {
    let (sum, total_alpha) = weighted.fold((Vec3::ZERO, 0.0), |(sum, total), (value, alpha)| {
        (sum + value * alpha, total + alpha)
    });
    if total_alpha <= 0.0 {
        world
    } else if total_alpha < 1.0 {
        sum + world * (1.0 - total_alpha)
    } else {
        sum / total_alpha
    }
}

/// Character position blended between world space and the frames of the tracked platforms
pub fn blend_position(platforms: &TrackedPlatforms, world_position: Vec3) -> Vec3 {
    blend(
        platforms
            .iter()
            .map(|slot| (slot.character_position(), slot.alpha)),
        world_position,
    )
}

/// Character velocity blended between world space and the frames of the tracked platforms
pub fn blend_velocity(platforms: &TrackedPlatforms, world_velocity: Vec3) -> Vec3 {
    blend(
        platforms
            .iter()
            .map(|slot| (slot.character_world_velocity(), slot.alpha)),
        world_velocity,
    )
}

impl PlatformSnapshot {
    pub fn blended_position(&self) -> Vec3 {
        blend_position(&self.platforms, self.character.position)
    }

    pub fn blended_velocity(&self) -> Vec3 {
        blend_velocity(&self.platforms, self.character.velocity)
    }
}

impl SnapshotPair {
    /// Render position: each snapshot is blended, then the two results are interpolated
    pub fn position(&self) -> Vec3 {
        self.from
            .blended_position()
            .lerp(self.to.blended_position(), self.alpha)
    }

    pub fn velocity(&self) -> Vec3 {
        self.from
            .blended_velocity()
            .lerp(self.to.blended_velocity(), self.alpha)
    }

    /// Interpolated world-space state, ignoring the platforms
    pub fn world_position(&self) -> Vec3 {
        self.from
            .character
            .position
            .lerp(self.to.character.position, self.alpha)
    }

    pub fn world_velocity(&self) -> Vec3 {
        self.from
            .character
            .velocity
            .lerp(self.to.character.velocity, self.alpha)
    }

    /// Blend alpha of `platform`, interpolated between the two snapshots
    pub fn platform_alpha(&self, platform: Entity) -> f32 {
        let from = self.from.platforms.alpha_of(platform);
        let to = self.to.platforms.alpha_of(platform);
        from + (to - from) * self.alpha
    }

    /// Character offset in the frame of `platform`, interpolated between the snapshots that track it
    pub fn platform_offset(&self, platform: Entity) -> Option<Vec3> {
        let from = self.from.platforms.tracked(platform);
        let to = self.to.platforms.tracked(platform);
        match (from, to) {
            (Some(from), Some(to)) => Some(
                from.character_offset
                    .lerp(to.character_offset, self.alpha),
            ),
            (Some(slot), None) | (None, Some(slot)) => Some(slot.character_offset),
            (None, None) => None,
        }
    }
}
