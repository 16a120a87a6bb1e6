//! Clocks driving the simulation and the snapshot interpolation.
use crate::tick::Tick;
use bevy_ecs::prelude::{ResMut, Resource};
use bevy_ecs::reflect::ReflectResource;
use bevy_reflect::Reflect;
use core::time::Duration;
use tracing::trace;

/// Fixed-rate simulation clock.
///
/// `tick` is the tick of the step currently being simulated.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct SimulationClock {
    pub tick: Tick,
    pub tick_duration: Duration,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(1.0 / 64.0))
    }
}

impl SimulationClock {
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            tick: Tick(0),
            tick_duration,
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Duration of one simulation step, in seconds
    pub fn delta_secs(&self) -> f32 {
        self.tick_duration.as_secs_f32()
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }
}

/// Point in time at which snapshot-interpolated entities are displayed.
///
/// Maintained by the replication substrate; it lags behind the most recent received snapshot
/// so that there is usually a snapshot on each side of it.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct InterpolationTime {
    pub tick: Tick,
    /// Fraction of a tick elapsed after `tick`, in `[0, 1)`
    pub overstep: f32,
}

impl InterpolationTime {
    pub fn new(tick: Tick, overstep: f32) -> Self {
        Self {
            tick,
            overstep: overstep.clamp(0.0, 1.0),
        }
    }
}

pub(crate) fn advance_simulation_clock(mut clock: ResMut<SimulationClock>) {
    clock.advance();
    trace!(tick = ?clock.tick, "advanced simulation clock");
}
