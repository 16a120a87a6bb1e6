use crate::stepper::Stepper;
use alloc::sync::Arc;
use approx::assert_relative_eq;
use bevy_ecs::entity::Entity;
use bevy_math::{EulerRot, Quat, Vec3};
use bevy_transform::components::Transform;
use carrier::prelude::*;
use core::f32::consts::FRAC_PI_2;
use core::sync::atomic::{AtomicUsize, Ordering};
use test_log::test;

/// Character standing on a platform, tracked with alpha 1
fn rider_on_platform(stepper: &mut Stepper) -> (Entity, Entity) {
    let platform = stepper.spawn_platform(Vec3::ZERO);
    let character = stepper.spawn_character(Vec3::new(2.0, 1.0, 0.0));
    stepper.set_contacts(character, &[platform]);
    stepper.tick_step(1);
    (platform, character)
}

#[test]
fn test_translating_platform_carries_character() {
    let mut stepper = Stepper::default();
    let (platform, character) = rider_on_platform(&mut stepper);

    stepper.set_platform_pose(platform, Vec3::new(0.5, 0.0, -0.5), Quat::IDENTITY);
    stepper.tick_step(1);

    let expected = Vec3::new(2.5, 1.0, -0.5);
    let state = stepper.get::<KinematicState>(character);
    assert!(state.position.abs_diff_eq(expected, 1e-5));
    // the collider transform follows the kinematic state
    let transform = stepper.get::<Transform>(character);
    assert!(transform.translation.abs_diff_eq(expected, 1e-5));

    // no platform motion: no drift
    stepper.tick_step(3);
    assert!(
        stepper
            .get::<KinematicState>(character)
            .position
            .abs_diff_eq(expected, 1e-5)
    );
}

#[test]
fn test_rotating_platform_carries_and_yaws_character() {
    let mut stepper = Stepper::default();
    let (platform, character) = rider_on_platform(&mut stepper);

    stepper.set_platform_pose(platform, Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2));
    stepper.tick_step(1);

    let state = stepper.get::<KinematicState>(character);
    assert!(state.position.abs_diff_eq(Vec3::new(0.0, 1.0, -2.0), 1e-5));
    assert_relative_eq!(
        state.rotation.to_euler(EulerRot::YXZ).0,
        FRAC_PI_2,
        epsilon = 1e-5
    );
}

#[test]
fn test_collider_transform_follows_platform_rotation() {
    let mut stepper = Stepper::default();
    let (platform, character) = rider_on_platform(&mut stepper);

    stepper.set_platform_pose(platform, Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2));
    stepper.tick_step(1);

    let state = stepper.get::<KinematicState>(character);
    let transform = stepper.get::<Transform>(character);
    assert!(transform.translation.abs_diff_eq(state.position, 1e-6));
    assert!(transform.rotation.abs_diff_eq(state.rotation, 1e-6));
    assert!(
        transform
            .rotation
            .abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2), 1e-5)
    );
}

#[test]
fn test_character_moves_relative_to_platform() {
    let mut stepper = Stepper::default();
    let (platform, character) = rider_on_platform(&mut stepper);
    stepper
        .world_mut()
        .get_mut::<KinematicState>(character)
        .unwrap()
        .velocity = Vec3::new(0.0, 0.0, 50.0);

    // the platform moves +X while the character walks +Z (1 unit per 20ms tick)
    stepper.set_platform_pose(platform, Vec3::X, Quat::IDENTITY);
    stepper.tick_step(1);
    assert!(
        stepper
            .get::<KinematicState>(character)
            .position
            .abs_diff_eq(Vec3::new(3.0, 1.0, 1.0), 1e-4)
    );

    // the post-move state is expressed in the platform frame
    let tracked = stepper.get::<TrackedPlatforms>(character);
    let slot = tracked.tracked(platform).unwrap();
    assert!(slot.character_offset.abs_diff_eq(Vec3::new(2.0, 1.0, 1.0), 1e-4));
    assert!(slot.character_velocity.abs_diff_eq(Vec3::new(0.0, 0.0, 50.0), 1e-4));
}

#[test]
fn test_opposite_platforms_cancel_out() {
    let mut stepper = Stepper::default();
    let left = stepper.spawn_platform(Vec3::ZERO);
    let right = stepper.spawn_platform(Vec3::ZERO);
    let character = stepper.spawn_character(Vec3::Y);
    stepper.set_contacts(character, &[left, right]);
    stepper.tick_step(1);

    stepper.set_platform_pose(left, -Vec3::X, Quat::IDENTITY);
    stepper.set_platform_pose(right, Vec3::X, Quat::IDENTITY);
    stepper.tick_step(1);
    assert!(
        stepper
            .get::<KinematicState>(character)
            .position
            .abs_diff_eq(Vec3::Y, 1e-6)
    );
}

#[test]
fn test_listeners_are_notified_and_isolated() {
    let mut stepper = Stepper::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let (platform, character) = rider_on_platform(&mut stepper);
    stepper.world_mut().entity_mut(character).insert(
        PlatformDeltaListeners::default()
            .with(|_: &PlatformDelta| -> Result<(), PlatformError> {
                Err(PlatformError::Listener("camera rig missing".into()))
            })
            .with(move |delta: &PlatformDelta| -> Result<(), PlatformError> {
                if delta.position_delta.abs_diff_eq(Vec3::X, 1e-5) {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            }),
    );

    stepper.set_platform_pose(platform, Vec3::X, Quat::IDENTITY);
    stepper.tick_step(1);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_despawned_platform_is_released() {
    let mut stepper = Stepper::default();
    let (platform, character) = rider_on_platform(&mut stepper);
    stepper.world_mut().despawn(platform);

    stepper.tick_step(1);
    let state = stepper.get::<KinematicState>(character);
    assert!(state.position.abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), 1e-6));
    assert!(!stepper.get::<TrackedPlatforms>(character).is_tracking());
}
