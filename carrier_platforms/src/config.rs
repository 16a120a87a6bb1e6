use bevy_ecs::prelude::Resource;
use bevy_ecs::reflect::ReflectResource;
use bevy_reflect::Reflect;
use core::time::Duration;

/// Durations shorter than this are treated as instantaneous transitions
pub(crate) const MIN_TRANSITION_SECS: f32 = f32::EPSILON;

/// Config to specify how characters blend between world space and platform space
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct PlatformConfig {
    /// Simulation time for the blend alpha of a platform to go from 0 to 1 after the character
    /// starts overlapping it
    pub enter_duration: Duration,
    /// Simulation time for the blend alpha of a platform to go from 1 to 0 after the character
    /// left it, while the character is on another platform
    pub platform_to_platform_leave: Duration,
    /// Simulation time for the blend alpha of a platform to go from 1 to 0 after the character
    /// left it for world space
    pub platform_to_world_leave: Duration,
    /// Wall-clock time over which the render position is pulled into the frame of a platform
    /// that just appeared in the snapshots
    pub render_enter_duration: Duration,
    /// Wall-clock time over which the render pull of a platform fades out
    pub render_leave_duration: Duration,
    /// Number of ticks of authoritative platform state kept for reconciliation
    pub history_ticks: usize,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            enter_duration: Duration::from_millis(100),
            platform_to_platform_leave: Duration::from_millis(100),
            platform_to_world_leave: Duration::from_millis(250),
            render_enter_duration: Duration::from_millis(100),
            render_leave_duration: Duration::from_millis(250),
            history_ticks: 64,
        }
    }
}

impl PlatformConfig {
    pub fn with_enter_duration(mut self, enter_duration: Duration) -> Self {
        self.enter_duration = enter_duration;
        self
    }

    pub fn with_leave_durations(
        mut self,
        platform_to_platform: Duration,
        platform_to_world: Duration,
    ) -> Self {
        self.platform_to_platform_leave = platform_to_platform;
        self.platform_to_world_leave = platform_to_world;
        self
    }

    pub fn with_render_durations(mut self, enter: Duration, leave: Duration) -> Self {
        self.render_enter_duration = enter;
        self.render_leave_duration = leave;
        self
    }

    pub fn with_history_ticks(mut self, history_ticks: usize) -> Self {
        self.history_ticks = history_ticks;
        self
    }

    /// Every transition is instantaneous
    pub fn instant() -> Self {
        Self {
            enter_duration: Duration::ZERO,
            platform_to_platform_leave: Duration::ZERO,
            platform_to_world_leave: Duration::ZERO,
            render_enter_duration: Duration::ZERO,
            render_leave_duration: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Duration of the blend-out of a platform that the character left.
    pub(crate) fn leave_duration(&self, other_platform_active: bool) -> Duration {
        if other_platform_active {
            self.platform_to_platform_leave
        } else {
            self.platform_to_world_leave
        }
    }
}

/// Move `alpha` toward `target` by `delta / duration`.
///
/// A (near) zero duration snaps to the target instead of dividing by it.
pub(crate) fn step_alpha(alpha: f32, target: f32, delta: f32, duration: Duration) -> f32 {
    let duration = duration.as_secs_f32();
    if duration <= MIN_TRANSITION_SECS {
        return target;
    }
    let step = delta.max(0.0) / duration;
    if target >= alpha {
        (alpha + step).min(target)
    } else {
        (alpha - step).max(target)
    }
}
