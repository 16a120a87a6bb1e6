use crate::config::PlatformConfig;
use crate::history::{
    FramePlatforms, PlatformHistory, PlatformSnapshots, SnapshotInterpolation,
    record_platforms_system, select_snapshots_system,
};
use crate::lifecycle::update_lifecycle_system;
use crate::listener::PlatformDeltaListeners;
use crate::platform::Platform;
use crate::propagate::propagate_system;
use crate::registry::{OverlappingPlatforms, collect_overlapping_platforms};
use crate::render::{RenderPlatforms, render_interpolated_system, render_simulated_system};
use crate::state::TrackedPlatforms;
use bevy_app::{App, FixedUpdate, Plugin, PostUpdate};
use bevy_ecs::prelude::*;
use bevy_ecs::reflect::ReflectComponent;
use bevy_reflect::Reflect;
use bevy_time::{Real, Time};
use carrier_core::kinematic::{
    KinematicContacts, KinematicMode, KinematicRender, KinematicState, SuppressedFeatures,
};
use carrier_core::plugin::KinematicSystems;

/// Marker for characters that can be carried by platforms.
///
/// Inserts every component used by the platform systems.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
#[require(
    KinematicState,
    KinematicMode,
    KinematicContacts,
    KinematicRender,
    SuppressedFeatures,
    OverlappingPlatforms,
    TrackedPlatforms,
    PlatformHistory,
    FramePlatforms,
    PlatformSnapshots,
    SnapshotInterpolation,
    RenderPlatforms,
    PlatformDeltaListeners
)]
pub struct PlatformRider;

#[derive(Default)]
pub struct PlatformPlugin {
    config: PlatformConfig,
}

impl PlatformPlugin {
    pub fn new(config: PlatformConfig) -> Self {
        Self { config }
    }
}

impl Plugin for PlatformPlugin {
    fn build(&self, app: &mut App) {
        // REFLECT
        app.register_type::<Platform>()
            .register_type::<PlatformRider>()
            .register_type::<TrackedPlatforms>()
            .register_type::<PlatformConfig>();

        // RESOURCES
        app.insert_resource(self.config);
        app.init_resource::<Time<Real>>();

        // SYSTEMS
        app.add_systems(
            FixedUpdate,
            (
                (collect_overlapping_platforms, update_lifecycle_system)
                    .chain()
                    .in_set(KinematicSystems::Lifecycle),
                propagate_system.in_set(KinematicSystems::Propagate),
                record_platforms_system.in_set(KinematicSystems::Record),
            ),
        );
        app.add_systems(
            PostUpdate,
            (
                render_simulated_system,
                (select_snapshots_system, render_interpolated_system).chain(),
            )
                .in_set(KinematicSystems::Render),
        );
    }
}
