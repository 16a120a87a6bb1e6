use crate::kinematic::{KinematicMode, KinematicRender, KinematicState, SuppressedFeatures};
use crate::timeline::{InterpolationTime, SimulationClock, advance_simulation_clock};
use bevy_app::{App, FixedFirst, FixedUpdate, Plugin, PostUpdate};
use bevy_ecs::prelude::*;
use bevy_time::{Fixed, Time};
use core::time::Duration;

/// Phases of a character step.
///
/// Within a fixed step, the phases run in the order
/// `Lifecycle -> Propagate -> Move -> Record`; `Render` runs once per frame in `PostUpdate`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum KinematicSystems {
    // FixedUpdate Sets
    /// Processors update which external objects affect the character
    Lifecycle,
    /// Processors apply external motion to the authoritative kinematic state
    Propagate,
    /// The character core runs its own predicted move.
    /// Nothing is added to this set by carrier itself
    Move,
    /// Processors capture the post-move state (history, snapshots)
    Record,

    // PostUpdate Sets
    /// Compute the render-time state of the character
    Render,
}

pub struct CorePlugin {
    pub tick_duration: Duration,
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self {
            tick_duration: SimulationClock::default().tick_duration,
        }
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        // REFLECT
        app.register_type::<KinematicState>()
            .register_type::<KinematicMode>()
            .register_type::<KinematicRender>()
            .register_type::<SuppressedFeatures>()
            .register_type::<SimulationClock>()
            .register_type::<InterpolationTime>();

        // RESOURCES
        app.insert_resource(SimulationClock::new(self.tick_duration));
        // FixedUpdate runs once per simulation tick
        app.insert_resource(Time::<Fixed>::from_duration(self.tick_duration));
        app.init_resource::<InterpolationTime>();

        // SETS
        app.configure_sets(
            FixedUpdate,
            (
                KinematicSystems::Lifecycle,
                KinematicSystems::Propagate,
                KinematicSystems::Move,
                KinematicSystems::Record,
            )
                .chain(),
        );
        app.configure_sets(PostUpdate, KinematicSystems::Render);

        // SYSTEMS
        app.add_systems(FixedFirst, advance_simulation_clock);
        app.add_systems(
            FixedUpdate,
            clear_suppressed_features.before(KinematicSystems::Lifecycle),
        );
    }
}

/// Suppressions only last for one step
pub(crate) fn clear_suppressed_features(mut query: Query<&mut SuppressedFeatures>) {
    for mut features in query.iter_mut() {
        if !features.is_empty() {
            features.clear();
        }
    }
}
