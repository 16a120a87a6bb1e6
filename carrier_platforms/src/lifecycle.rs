//! Activation, deactivation and blend of the tracked platforms.
//!
//! Each simulation step the overlapping platforms are diffed against the tracked slots:
//! - tracked platforms that stopped overlapping become [`PlatformLifecycle::Inactive`]
//! - new overlapping platforms claim the first free slot, or are re-activated if their slot is still inactive
//! - the blend alphas move toward 1 (active) or 0 (inactive); inactive slots are freed when their alpha reaches 0
use crate::config::{PlatformConfig, step_alpha};
use crate::platform::{Platform, PlatformLookup, PlatformPose};
use crate::registry::OverlappingPlatforms;
use crate::state::{PlatformLifecycle, TrackedPlatforms};
use bevy_ecs::entity::Entity;
use bevy_ecs::prelude::*;
use bevy_transform::components::Transform;
use carrier_core::kinematic::{KinematicMode, KinematicState};
use carrier_core::timeline::SimulationClock;
use tracing::{debug, trace};

/// Run one lifecycle step for a character.
pub fn update_lifecycle(
    entity: Entity,
    tracked: &mut TrackedPlatforms,
    overlapping: &OverlappingPlatforms,
    character: &KinematicState,
    lookup: &impl PlatformLookup,
    config: &PlatformConfig,
    delta: f32,
) {
    // 1. platforms that are not overlapping anymore start blending out
    for slot in tracked.slots_mut() {
        if slot.is_active() && !overlapping.contains(slot.platform) {
            trace!(?entity, platform = ?slot.platform, "platform deactivated");
            slot.lifecycle = PlatformLifecycle::Inactive;
        }
    }

    // 2. new platforms claim a slot
    for platform in overlapping.iter() {
        if let Some(index) = tracked.find(platform) {
            if let Some(slot) = tracked.get_mut(index)
                && slot.lifecycle == PlatformLifecycle::Inactive
            {
                trace!(?entity, ?platform, alpha = slot.alpha, "platform re-activated");
                slot.lifecycle = PlatformLifecycle::Active;
            }
            continue;
        }
        let pose = match lookup.pose(platform) {
            Ok(pose) => pose,
            Err(e) => {
                trace!(?entity, ?platform, "cannot track platform: {e}");
                continue;
            }
        };
        match tracked.claim(platform, pose, character) {
            Ok(index) => {
                debug!(?entity, ?platform, index, "started tracking platform");
            }
            Err(e) => {
                debug!(?entity, ?platform, "{e}");
            }
        }
    }

    // 3. advance the blend alphas
    let leave_duration = config.leave_duration(tracked.active_count() > 0);
    for index in 0..tracked.capacity() {
        let Some(slot) = tracked.get_mut(index) else {
            continue;
        };
        match slot.lifecycle {
            PlatformLifecycle::None => {}
            PlatformLifecycle::Active => {
                slot.alpha = step_alpha(slot.alpha, 1.0, delta, config.enter_duration);
            }
            PlatformLifecycle::Inactive => {
                slot.alpha = step_alpha(slot.alpha, 0.0, delta, leave_duration);
                if slot.alpha <= 0.0 {
                    debug!(?entity, platform = ?slot.platform, "stopped tracking platform");
                    tracked.free(index);
                }
            }
        }
    }
}

pub(crate) fn update_lifecycle_system(
    config: Res<PlatformConfig>,
    clock: Res<SimulationClock>,
    platforms: Query<&Transform, With<Platform>>,
    mut query: Query<
        (
            Entity,
            &KinematicMode,
            &KinematicState,
            &OverlappingPlatforms,
            &mut TrackedPlatforms,
        ),
        Without<Platform>,
    >,
) {
    let lookup = |platform: Entity| platforms.get(platform).ok().map(PlatformPose::from);
    let delta = clock.delta_secs();
    for (entity, mode, character, overlapping, mut tracked) in query.iter_mut() {
        if !mode.is_simulated() {
            continue;
        }
        update_lifecycle(
            entity,
            &mut tracked,
            overlapping,
            character,
            &lookup,
            &config,
            delta,
        );
    }
}
