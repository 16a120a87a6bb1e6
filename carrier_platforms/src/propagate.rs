//! Carry characters along with the motion of the platforms they track.
//!
//! Each active platform contributes the world-space displacement that its motion since the last
//! step applies to the character. The contributions are composed per axis as `min + max`, so that
//! two platforms moving the character the same way do not add up, while opposite motions cancel.
use crate::listener::{PlatformDelta, PlatformDeltaListeners};
use crate::platform::{Platform, PlatformLookup, PlatformPose};
use crate::state::{MAX_TRACKED_PLATFORMS, TrackedPlatforms};
use bevy_ecs::entity::Entity;
use bevy_ecs::prelude::*;
use bevy_math::{EulerRot, Quat, Vec3};
use bevy_transform::components::Transform;
use carrier_core::kinematic::{KinematicFeature, KinematicMode, KinematicState, SuppressedFeatures};
use smallvec::SmallVec;
use tracing::trace;

/// Motion applied to a character by its platforms during one step
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlatformMotion {
    /// Composed world-space displacement applied to the character position
    pub position_delta: Vec3,
    /// Composed world-space yaw applied to the character look rotation, in radians
    pub yaw: f32,
    /// Whether at least one platform was active (in contact) during the step
    pub any_active: bool,
}

impl PlatformMotion {
    pub fn rotation_delta(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Whether the platforms moved the character during the step
    pub fn is_moving(&self) -> bool {
        self.position_delta != Vec3::ZERO || self.yaw != 0.0
    }
}

/// Compose deltas per axis: the most negative and the most positive contribution are summed.
///
/// Both bounds start at zero, so a single delta is applied unchanged and a zero delta
/// contributes nothing.
pub fn compose_min_max(deltas: impl IntoIterator<Item = Vec3>) -> Vec3 {
    let (min, max) = deltas
        .into_iter()
        .fold((Vec3::ZERO, Vec3::ZERO), |(min, max), delta| {
            (min.min(delta), max.max(delta))
        });
    min + max
}

fn compose_yaw(yaws: impl IntoIterator<Item = f32>) -> f32 {
    let (min, max) = yaws
        .into_iter()
        .fold((0.0f32, 0.0f32), |(min, max), yaw| (min.min(yaw), max.max(yaw)));
    min + max
}

/// Yaw component of a world-space rotation
fn yaw_of(rotation: Quat) -> f32 {
    rotation.to_euler(EulerRot::YXZ).0
}

/// Apply the motion of the tracked platforms to the character.
///
/// Only active platforms that can be resolved contribute. Afterwards every resolvable platform
/// (active or not) stores its current pose and re-expresses the character state in its frame.
pub fn propagate(
    tracked: &mut TrackedPlatforms,
    character: &mut KinematicState,
    lookup: &impl PlatformLookup,
) -> PlatformMotion {
    let mut poses: SmallVec<[Option<PlatformPose>; MAX_TRACKED_PLATFORMS]> = SmallVec::new();
    let mut deltas: SmallVec<[Vec3; MAX_TRACKED_PLATFORMS]> = SmallVec::new();
    let mut yaws: SmallVec<[f32; MAX_TRACKED_PLATFORMS]> = SmallVec::new();
    let mut any_active = false;
    for slot in tracked.slots() {
        let pose = if slot.is_empty() {
            None
        } else {
            lookup
                .pose(slot.platform)
                .inspect_err(|e| trace!("using cached platform pose: {e}"))
                .ok()
        };
        if slot.is_active() {
            any_active = true;
            if let Some(pose) = &pose {
                deltas.push(slot.carried_delta(pose));
                yaws.push(yaw_of(slot.rotation_delta(pose)));
            }
        }
        poses.push(pose);
    }

    let motion = PlatformMotion {
        position_delta: compose_min_max(deltas),
        yaw: compose_yaw(yaws),
        any_active,
    };
    character.position += motion.position_delta;
    character.apply_yaw(motion.yaw);

    for (slot, pose) in tracked.slots_mut().iter_mut().zip(poses) {
        if let Some(pose) = pose {
            slot.capture(pose, character);
        }
    }
    motion
}

pub(crate) fn propagate_system(
    platforms: Query<&Transform, With<Platform>>,
    mut query: Query<
        (
            Entity,
            &KinematicMode,
            &mut TrackedPlatforms,
            &mut KinematicState,
            &mut SuppressedFeatures,
            Option<&mut Transform>,
            Option<&mut PlatformDeltaListeners>,
        ),
        Without<Platform>,
    >,
) {
    let lookup = |platform: Entity| platforms.get(platform).ok().map(PlatformPose::from);
    for (entity, mode, mut tracked, mut state, mut features, transform, listeners) in
        query.iter_mut()
    {
        if !mode.is_simulated() || !tracked.is_tracking() {
            continue;
        }
        let motion = propagate(&mut tracked, &mut state, &lookup);
        trace!(?entity, ?motion, "propagated platform motion");

        // platform motion is not a misprediction
        features.suppress(KinematicFeature::PredictionCorrection);
        features.suppress(KinematicFeature::AntiJitter);

        if !motion.any_active {
            continue;
        }
        if let Some(mut transform) = transform {
            transform.translation = state.position;
            transform.rotation = state.rotation;
        }
        if let Some(mut listeners) = listeners
            && motion.is_moving()
        {
            listeners.notify(&PlatformDelta {
                character: entity,
                state: *state,
                position_delta: motion.position_delta,
                rotation_delta: motion.rotation_delta(),
            });
        }
    }
}
