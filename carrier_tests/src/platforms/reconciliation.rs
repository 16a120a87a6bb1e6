use crate::stepper::Stepper;
use bevy_math::{Quat, Vec3};
use carrier::prelude::*;
use test_log::test;

#[test]
fn test_history_is_recorded_every_tick() {
    let mut stepper = Stepper::new(PlatformConfig::instant().with_history_ticks(5));
    let platform = stepper.spawn_platform(Vec3::ZERO);
    let character = stepper.spawn_character(Vec3::Y);
    stepper.set_contacts(character, &[platform]);

    stepper.tick_step(8);
    let tick = stepper.tick();
    let history = stepper.get::<PlatformHistory>(character);
    assert_eq!(history.len(), 5);
    assert_eq!(
        history.get(tick),
        Some(&stepper.get::<TrackedPlatforms>(character))
    );
    assert!(history.get(tick - 5u16).is_none());
}

#[test]
fn test_matching_confirmation_does_not_roll_back() {
    let mut stepper = Stepper::default();
    let platform = stepper.spawn_platform(Vec3::ZERO);
    let character = stepper.spawn_character(Vec3::Y);
    stepper.set_contacts(character, &[platform]);
    stepper.tick_step(3);

    let confirmed_tick = stepper.tick() - 1u16;
    let confirmed = *stepper
        .get::<PlatformHistory>(character)
        .get(confirmed_tick)
        .unwrap();

    let mut entity = stepper.world_mut().entity_mut(character);
    let mut live = *entity.get::<TrackedPlatforms>().unwrap();
    let mut history = entity.get_mut::<PlatformHistory>().unwrap();
    assert!(!reconcile(&mut live, &mut history, confirmed_tick, &confirmed));
    assert_eq!(history.len(), 3);
}

#[test]
fn test_misprediction_restores_confirmed_state() {
    let mut stepper = Stepper::default();
    let platform = stepper.spawn_platform(Vec3::ZERO);
    let character = stepper.spawn_character(Vec3::Y);
    stepper.set_contacts(character, &[platform]);
    stepper.tick_step(3);
    let confirmed_tick = stepper.tick() - 1u16;

    // the server saw the platform one unit further
    let mut confirmed = *stepper
        .get::<PlatformHistory>(character)
        .get(confirmed_tick)
        .unwrap();
    let index = confirmed.find(platform).unwrap();
    confirmed.get_mut(index).unwrap().position = Vec3::X;

    {
        let mut entity = stepper.world_mut().entity_mut(character);
        let mut live = *entity.get::<TrackedPlatforms>().unwrap();
        let mut history = entity.get_mut::<PlatformHistory>().unwrap();
        assert!(reconcile(&mut live, &mut history, confirmed_tick, &confirmed));
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(confirmed_tick), Some(&confirmed));
        entity.insert(live);
    }
    assert_eq!(stepper.get::<TrackedPlatforms>(character), confirmed);

    // re-simulating carries the character by the difference with the live platform pose
    stepper.set_platform_pose(platform, Vec3::ZERO, Quat::IDENTITY);
    stepper.tick_step(1);
    assert!(
        stepper
            .get::<KinematicState>(character)
            .position
            .abs_diff_eq(Vec3::new(-1.0, 1.0, 0.0), 1e-5)
    );
}
