//! Platforms currently overlapping a character.
use crate::platform::Platform;
use crate::state::MAX_TRACKED_PLATFORMS;
use bevy_ecs::entity::Entity;
use bevy_ecs::prelude::*;
use carrier_core::kinematic::KinematicContacts;
use smallvec::SmallVec;
use tracing::trace;

/// Platforms overlapping the character this step, in contact order.
///
/// At most [`MAX_TRACKED_PLATFORMS`] are kept; later contacts are ignored (first-fit).
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct OverlappingPlatforms(SmallVec<[Entity; MAX_TRACKED_PLATFORMS]>);

impl OverlappingPlatforms {
    pub fn new(platforms: impl IntoIterator<Item = Entity>) -> Self {
        let mut overlapping = Self::default();
        for platform in platforms {
            overlapping.insert(platform);
        }
        overlapping
    }

    /// Add a platform. Returns false if the platform was already present or the registry is full
    pub fn insert(&mut self, platform: Entity) -> bool {
        if self.0.len() >= MAX_TRACKED_PLATFORMS || self.contains(platform) {
            return false;
        }
        self.0.push(platform);
        true
    }

    pub fn contains(&self, platform: Entity) -> bool {
        self.0.contains(&platform)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }
}

/// Keep the contacts of each character that are platforms
pub(crate) fn collect_overlapping_platforms(
    platforms: Query<(), With<Platform>>,
    mut query: Query<(Entity, &KinematicContacts, &mut OverlappingPlatforms)>,
) {
    for (entity, contacts, mut overlapping) in query.iter_mut() {
        overlapping.clear();
        for contact in contacts.iter().filter(|contact| platforms.contains(*contact)) {
            if !overlapping.insert(contact) {
                trace!(?entity, platform = ?contact, "ignoring overlapping platform");
            }
        }
    }
}
