//! Render-time position and velocity of characters.
//!
//! Locally simulated characters interpolate between their last two fixed steps. Proxy characters
//! interpolate between received snapshots; because snapshots lag behind the live platforms, the
//! proxy render position is additionally pulled toward the live frame of the platforms it rides.
//! That pull fades in when a platform appears in the snapshots ([`PlatformEnter`]) and fades out
//! once it disappears ([`PlatformExit`]), using wall-clock time.
use crate::config::{MIN_TRANSITION_SECS, PlatformConfig};
use crate::history::{FramePlatforms, SnapshotInterpolation, SnapshotPair};
use crate::platform::{Platform, PlatformLookup, PlatformPose};
use crate::state::MAX_TRACKED_PLATFORMS;
use bevy_ecs::entity::Entity;
use bevy_ecs::prelude::*;
use bevy_math::Vec3;
use bevy_time::{Fixed, Real, Time};
use bevy_transform::components::Transform;
use carrier_core::kinematic::{KinematicMode, KinematicRender, KinematicState};
use core::time::Duration;
use smallvec::SmallVec;
use tracing::trace;

/// A platform that appeared in the snapshots of a proxy character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformEnter {
    pub platform: Entity,
    /// Wall-clock time (in seconds) at which the platform appeared
    pub timestamp: f64,
    /// Rises from 0 to 1 over the render enter duration
    pub enter_alpha: f32,
    /// Starts at 1 and decays over the render leave duration, but never below the
    /// interpolated snapshot alpha of the platform
    pub state_alpha: f32,
    /// Interpolated character offset in the frame of the platform
    pub offset: Vec3,
    /// Last live pose of the platform
    pub last_pose: PlatformPose,
}

impl PlatformEnter {
    pub fn weight(&self) -> f32 {
        self.enter_alpha * self.state_alpha
    }

    pub fn target(&self) -> Vec3 {
        self.last_pose.to_world(self.offset)
    }
}

/// A platform that disappeared from the snapshots of a proxy character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformExit {
    pub platform: Entity,
    /// Pose of the platform when it disappeared
    pub pose: PlatformPose,
    pub offset: Vec3,
    /// Decays to 0 over the render leave duration
    pub weight: f32,
}

impl PlatformExit {
    pub fn target(&self) -> Vec3 {
        self.pose.to_world(self.offset)
    }
}

/// Render-side platform state of a character. Never replicated
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct RenderPlatforms {
    pub enters: SmallVec<[PlatformEnter; MAX_TRACKED_PLATFORMS]>,
    pub exits: SmallVec<[PlatformExit; MAX_TRACKED_PLATFORMS]>,
    /// Wall-clock time and render position of the previous frame
    pub previous: Option<(f64, Vec3)>,
}

fn fraction(elapsed: f32, duration: Duration) -> f32 {
    let duration = duration.as_secs_f32();
    if duration <= MIN_TRANSITION_SECS {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

impl RenderPlatforms {
    /// Update the enter/exit records from the snapshot pair and pull `position` toward the
    /// live frames of the platforms.
    ///
    /// `now` is the wall-clock time in seconds, `delta` the wall-clock time since the last frame.
    pub fn smooth(
        &mut self,
        pair: &SnapshotPair,
        position: Vec3,
        lookup: &impl PlatformLookup,
        config: &PlatformConfig,
        now: f64,
        delta: f32,
    ) -> Vec3 {
        let leave_step = fraction(delta, config.render_leave_duration);

        // fade out the exits
        self.exits.retain(|exit| {
            exit.weight -= leave_step;
            exit.weight > 0.0
        });

        // platforms that left the snapshots, or that cannot be resolved anymore, become exits
        let mut index = 0;
        while index < self.enters.len() {
            let enter = self.enters[index];
            let live_pose = pair
                .to
                .platforms
                .tracked(enter.platform)
                .and_then(|_| lookup.pose(enter.platform).ok());
            match live_pose {
                Some(pose) => {
                    let snapshot_alpha = pair.platform_alpha(enter.platform);
                    let offset = pair.platform_offset(enter.platform);
                    let enter = &mut self.enters[index];
                    enter.enter_alpha = fraction(
                        (now - enter.timestamp) as f32,
                        config.render_enter_duration,
                    );
                    enter.state_alpha = (enter.state_alpha - leave_step).max(snapshot_alpha);
                    if let Some(offset) = offset {
                        enter.offset = offset;
                    }
                    enter.last_pose = pose;
                    index += 1;
                }
                None => {
                    trace!(platform = ?enter.platform, "platform left the snapshots");
                    self.enters.swap_remove(index);
                    if enter.weight() > 0.0 {
                        self.exits.push(PlatformExit {
                            platform: enter.platform,
                            pose: enter.last_pose,
                            offset: enter.offset,
                            weight: enter.weight(),
                        });
                    }
                }
            }
        }

        // platforms that appeared in the snapshots
        for slot in pair.to.platforms.iter() {
            if self.enters.iter().any(|enter| enter.platform == slot.platform) {
                continue;
            }
            let Ok(pose) = lookup.pose(slot.platform) else {
                continue;
            };
            trace!(platform = ?slot.platform, "platform entered the snapshots");
            self.exits.retain(|exit| exit.platform != slot.platform);
            self.enters.push(PlatformEnter {
                platform: slot.platform,
                timestamp: now,
                enter_alpha: fraction(0.0, config.render_enter_duration),
                state_alpha: 1.0,
                offset: pair
                    .platform_offset(slot.platform)
                    .unwrap_or(slot.character_offset),
                last_pose: pose,
            });
        }

        let (sum, total_weight) = self
            .enters
            .iter()
            .map(|enter| (enter.target(), enter.weight()))
            .chain(self.exits.iter().map(|exit| (exit.target(), exit.weight)))
            .fold((Vec3::ZERO, 0.0), |(sum, total), (target, weight)| {
                (sum + target * weight, total + weight)
            });
        if total_weight <= 0.0 {
            return position;
        }
        position.lerp(sum / total_weight, total_weight.min(1.0))
    }

    /// Render velocity of a locally simulated character: the motion of the render position since
    /// the previous frame, or `fallback` if no wall-clock time elapsed since then.
    pub fn track_velocity(&mut self, position: Vec3, now: f64, fallback: Vec3) -> Vec3 {
        let velocity = match self.previous {
            Some((previous_time, previous_position)) if now > previous_time => {
                (position - previous_position) / (now - previous_time) as f32
            }
            _ => fallback,
        };
        self.previous = Some((now, position));
        velocity
    }

    pub fn clear(&mut self) {
        self.enters.clear();
        self.exits.clear();
        self.previous = None;
    }
}

/// Render locally simulated characters between their last two fixed steps
pub(crate) fn render_simulated_system(
    fixed_time: Res<Time<Fixed>>,
    real_time: Res<Time<Real>>,
    mut query: Query<
        (
            &KinematicMode,
            &KinematicState,
            &FramePlatforms,
            &mut RenderPlatforms,
            &mut KinematicRender,
        ),
        Without<Platform>,
    >,
) {
    let overstep = fixed_time.overstep_fraction();
    let now = real_time.elapsed_secs_f64();
    for (mode, state, frame, mut render_platforms, mut render) in query.iter_mut() {
        if !mode.is_simulated() {
            continue;
        }
        let Some(pair) = frame.pair(overstep) else {
            *render = KinematicRender {
                position: state.position,
                velocity: state.velocity,
            };
            continue;
        };
        let position = pair.position();
        let velocity = render_platforms.track_velocity(position, now, pair.world_velocity());
        *render = KinematicRender { position, velocity };
    }
}

/// Render proxy characters from their snapshot pair
pub(crate) fn render_interpolated_system(
    config: Res<PlatformConfig>,
    real_time: Res<Time<Real>>,
    platforms: Query<&Transform, With<Platform>>,
    mut query: Query<
        (
            Entity,
            &KinematicMode,
            &KinematicState,
            &SnapshotInterpolation,
            &mut RenderPlatforms,
            &mut KinematicRender,
        ),
        Without<Platform>,
    >,
) {
    let lookup = |platform: Entity| platforms.get(platform).ok().map(PlatformPose::from);
    let now = real_time.elapsed_secs_f64();
    let delta = real_time.delta_secs();
    for (entity, mode, state, interpolation, mut render_platforms, mut render) in query.iter_mut() {
        if mode.is_simulated() {
            continue;
        }
        let Some(pair) = interpolation.pair else {
            render_platforms.clear();
            *render = KinematicRender {
                position: state.position,
                velocity: state.velocity,
            };
            continue;
        };
        let position = render_platforms.smooth(
            &pair,
            pair.position(),
            &lookup,
            &config,
            now,
            delta,
        );
        trace!(?entity, ?position, "rendered proxy character");
        *render = KinematicRender {
            position,
            velocity: pair.velocity(),
        };
    }
}
