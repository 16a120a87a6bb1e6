use bevy_app::{App, FixedFirst, FixedUpdate, PostUpdate};
use bevy_ecs::prelude::*;
use bevy_math::{Quat, Vec3};
use bevy_transform::components::Transform;
use carrier::prelude::*;
use core::time::Duration;
use tracing::info;

pub const TICK_DURATION: Duration = Duration::from_millis(20);

/// Stepper with a single App running the carrier plugins.
///
/// The fixed and render schedules are run explicitly, so that a test controls exactly how many
/// simulation steps happen between two frames.
pub struct Stepper {
    pub app: App,
    pub tick_duration: Duration,
}

impl Default for Stepper {
    fn default() -> Self {
        Self::new(PlatformConfig::instant())
    }
}

impl Stepper {
    pub fn new(config: PlatformConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(CarrierPlugins {
            tick_duration: TICK_DURATION,
            config,
        });
        app.add_systems(
            FixedUpdate,
            move_characters.in_set(KinematicSystems::Move),
        );
        app.finish();
        app.cleanup();
        Self {
            app,
            tick_duration: TICK_DURATION,
        }
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn spawn_platform(&mut self, position: Vec3) -> Entity {
        self.world_mut()
            .spawn((Platform, Transform::from_translation(position)))
            .id()
    }

    /// Spawn a locally simulated character
    pub fn spawn_character(&mut self, position: Vec3) -> Entity {
        self.world_mut()
            .spawn((
                PlatformRider,
                KinematicState::from_position(position),
                Transform::from_translation(position),
            ))
            .id()
    }

    /// Spawn a proxy character positioned by snapshot interpolation
    pub fn spawn_proxy(&mut self) -> Entity {
        self.world_mut()
            .spawn((PlatformRider, KinematicMode::Interpolated))
            .id()
    }

    pub fn set_contacts(&mut self, character: Entity, contacts: &[Entity]) {
        self.world_mut()
            .entity_mut(character)
            .insert(KinematicContacts::new(contacts.iter().copied()));
    }

    pub fn set_platform_pose(&mut self, platform: Entity, position: Vec3, rotation: Quat) {
        self.world_mut()
            .entity_mut(platform)
            .insert(Transform::from_translation(position).with_rotation(rotation));
    }

    pub fn tick(&self) -> Tick {
        self.world().resource::<SimulationClock>().tick()
    }

    /// Run `n` fixed simulation steps
    pub fn tick_step(&mut self, n: usize) {
        for _ in 0..n {
            self.world_mut().run_schedule(FixedFirst);
            info!(tick = ?self.tick(), "Tick step");
            self.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Run the render phase of a frame
    pub fn frame_step(&mut self) {
        self.world_mut().run_schedule(PostUpdate);
    }

    pub fn get<C: Component + Clone>(&self, entity: Entity) -> C {
        self.world()
            .get::<C>(entity)
            .cloned()
            .unwrap_or_else(|| panic!("missing component {}", core::any::type_name::<C>()))
    }
}

/// Minimal character controller: integrates the velocity of simulated characters
pub fn move_characters(
    clock: Res<SimulationClock>,
    mut query: Query<(&KinematicMode, &mut KinematicState, &mut Transform), Without<Platform>>,
) {
    let delta = clock.delta_secs();
    for (mode, mut state, mut transform) in query.iter_mut() {
        if !mode.is_simulated() || state.velocity == Vec3::ZERO {
            continue;
        }
        let velocity = state.velocity;
        state.position += velocity * delta;
        transform.translation = state.position;
    }
}
