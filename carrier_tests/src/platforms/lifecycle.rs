use crate::stepper::Stepper;
use bevy_math::Vec3;
use carrier::prelude::*;
use core::time::Duration;
use test_log::test;

#[test]
fn test_rider_requires_platform_components() {
    let mut stepper = Stepper::default();
    let character = stepper.spawn_character(Vec3::ZERO);
    let entity = stepper.world().entity(character);
    assert!(entity.contains::<TrackedPlatforms>());
    assert!(entity.contains::<OverlappingPlatforms>());
    assert!(entity.contains::<KinematicContacts>());
    assert!(entity.contains::<PlatformHistory>());
    assert!(entity.contains::<RenderPlatforms>());
    assert_eq!(stepper.get::<KinematicMode>(character), KinematicMode::Simulated);
}

#[test]
fn test_platform_is_tracked_while_in_contact() {
    let mut stepper = Stepper::default();
    let platform = stepper.spawn_platform(Vec3::ZERO);
    let character = stepper.spawn_character(Vec3::new(0.0, 1.0, 0.0));

    stepper.set_contacts(character, &[platform]);
    stepper.tick_step(1);
    let tracked = stepper.get::<TrackedPlatforms>(character);
    let slot = tracked.tracked(platform).unwrap();
    assert!(slot.is_active());
    assert_eq!(slot.alpha, 1.0);
    assert!(slot.character_offset.abs_diff_eq(Vec3::Y, 1e-6));

    stepper.set_contacts(character, &[]);
    stepper.tick_step(1);
    assert!(!stepper.get::<TrackedPlatforms>(character).is_tracking());
}

#[test]
fn test_alpha_blends_in_over_enter_duration() {
    let mut stepper = Stepper::new(
        PlatformConfig::default().with_enter_duration(Duration::from_millis(100)),
    );
    let platform = stepper.spawn_platform(Vec3::ZERO);
    let character = stepper.spawn_character(Vec3::Y);
    stepper.set_contacts(character, &[platform]);

    // 20ms ticks
    let mut previous = 0.0;
    for _ in 0..5 {
        stepper.tick_step(1);
        let alpha = stepper.get::<TrackedPlatforms>(character).alpha_of(platform);
        assert!(alpha > previous);
        previous = alpha;
    }
    approx::assert_relative_eq!(previous, 1.0, epsilon = 1e-5);
}

#[test]
fn test_non_platform_contacts_are_ignored() {
    let mut stepper = Stepper::default();
    let wall = stepper.world_mut().spawn_empty().id();
    let character = stepper.spawn_character(Vec3::ZERO);
    stepper.set_contacts(character, &[wall]);
    stepper.tick_step(1);
    assert!(stepper.get::<OverlappingPlatforms>(character).is_empty());
    assert!(!stepper.get::<TrackedPlatforms>(character).is_tracking());
}

#[test]
fn test_at_most_three_platforms_are_tracked() {
    let mut stepper = Stepper::default();
    let platforms: Vec<_> = (0..4)
        .map(|i| stepper.spawn_platform(Vec3::new(i as f32, 0.0, 0.0)))
        .collect();
    let character = stepper.spawn_character(Vec3::Y);
    stepper.set_contacts(character, &platforms);
    stepper.tick_step(1);

    let tracked = stepper.get::<TrackedPlatforms>(character);
    assert_eq!(tracked.active_count(), MAX_TRACKED_PLATFORMS);
    assert_eq!(tracked.find(platforms[3]), None);
}

#[test]
fn test_features_suppressed_while_tracking() {
    let mut stepper = Stepper::default();
    let platform = stepper.spawn_platform(Vec3::ZERO);
    let character = stepper.spawn_character(Vec3::Y);

    stepper.tick_step(1);
    assert!(stepper.get::<SuppressedFeatures>(character).is_empty());

    stepper.set_contacts(character, &[platform]);
    stepper.tick_step(1);
    let features = stepper.get::<SuppressedFeatures>(character);
    assert!(features.is_suppressed(KinematicFeature::PredictionCorrection));
    assert!(features.is_suppressed(KinematicFeature::AntiJitter));

    stepper.set_contacts(character, &[]);
    stepper.tick_step(1);
    assert!(stepper.get::<SuppressedFeatures>(character).is_empty());
}
