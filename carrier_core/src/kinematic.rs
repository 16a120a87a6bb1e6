//! Contract between the character kinematic core and the processors that act on it.
//!
//! The character core owns these components. Processors (for example the platform processor)
//! read them during the [`KinematicSystems`](crate::plugin::KinematicSystems) phases and only
//! apply deltas to them; they never replace the state wholesale.
use bevy_ecs::entity::Entity;
use bevy_ecs::prelude::Component;
use bevy_ecs::reflect::ReflectComponent;
use bevy_math::{Quat, Vec3};
use bevy_reflect::Reflect;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Authoritative kinematic state of a character for the current simulation step.
#[derive(Component, Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct KinematicState {
    pub position: Vec3,
    /// Look rotation of the character
    pub rotation: Quat,
    pub velocity: Vec3,
}

impl KinematicState {
    pub fn new(position: Vec3, rotation: Quat, velocity: Vec3) -> Self {
        Self {
            position,
            rotation,
            velocity,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Rotate the look rotation around the world up axis.
    ///
    /// Pre-multiplying by a world-space yaw leaves the pitch and roll of the look rotation untouched.
    pub fn apply_yaw(&mut self, yaw: f32) {
        if yaw != 0.0 {
            self.rotation = (Quat::from_rotation_y(yaw) * self.rotation).normalize();
        }
    }
}

/// Whether the character is simulated locally (authority or predicted) or is a proxy
/// positioned by snapshot interpolation.
#[derive(Component, Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum KinematicMode {
    /// The character runs the fixed-step simulation on this peer
    #[default]
    Simulated,
    /// The character is a proxy of a remotely simulated character
    Interpolated,
}

impl KinematicMode {
    pub fn is_simulated(&self) -> bool {
        matches!(self, KinematicMode::Simulated)
    }
}

/// Features of the character core that processors can suppress for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[repr(u8)]
pub enum KinematicFeature {
    /// Smoothing of the error between the predicted and the corrected state after a rollback
    PredictionCorrection = 1 << 0,
    /// Filtering of small oscillations of the render position
    AntiJitter = 1 << 1,
}

/// Features suppressed for the current step.
///
/// Cleared at the start of every step; the character core must check it before running
/// the corresponding features.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct SuppressedFeatures(u8);

impl SuppressedFeatures {
    pub fn suppress(&mut self, feature: KinematicFeature) {
        self.0 |= feature as u8;
    }

    pub fn is_suppressed(&self, feature: KinematicFeature) -> bool {
        self.0 & (feature as u8) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Entities currently overlapping the character, as detected by the character core's collision queries.
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct KinematicContacts(pub SmallVec<[Entity; 8]>);

impl KinematicContacts {
    pub fn new(contacts: impl IntoIterator<Item = Entity>) -> Self {
        Self(contacts.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }
}

/// Render-time output for the character: the position and velocity that should be displayed this frame.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct KinematicRender {
    pub position: Vec3,
    pub velocity: Vec3,
}
