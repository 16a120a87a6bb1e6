use crate::stepper::Stepper;
use bevy_ecs::entity::Entity;
use bevy_math::{Quat, Vec3};
use carrier::prelude::*;
use core::time::Duration;
use test_log::test;

/// Snapshot of a character standing at `offset` above a platform at `platform_position`
fn snapshot_on(platform: Entity, platform_position: Vec3, offset: Vec3) -> PlatformSnapshot {
    let character = KinematicState::from_position(platform_position + offset);
    let mut platforms = TrackedPlatforms::default();
    let index = platforms
        .claim(
            platform,
            PlatformPose::from_position(platform_position),
            &character,
        )
        .unwrap();
    platforms.get_mut(index).unwrap().alpha = 1.0;
    PlatformSnapshot {
        character,
        platforms,
    }
}

fn receive(stepper: &mut Stepper, proxy: Entity, tick: u16, snapshot: PlatformSnapshot) {
    stepper
        .world_mut()
        .get_mut::<PlatformSnapshots>(proxy)
        .unwrap()
        .receive(Tick(tick), snapshot);
}

fn set_interpolation_time(stepper: &mut Stepper, tick: u16, overstep: f32) {
    stepper
        .world_mut()
        .insert_resource(InterpolationTime::new(Tick(tick), overstep));
}

#[test]
fn test_simulated_character_renders_fixed_step_interpolation() {
    let mut stepper = Stepper::default();
    let platform = stepper.spawn_platform(Vec3::ZERO);
    let character = stepper.spawn_character(Vec3::Y);
    stepper.set_contacts(character, &[platform]);
    stepper.tick_step(1);

    // before the second step there is only one snapshot
    stepper.frame_step();
    let render = stepper.get::<KinematicRender>(character);
    assert!(render.position.abs_diff_eq(Vec3::Y, 1e-6));
    assert_eq!(render.velocity, Vec3::ZERO);

    stepper.set_platform_pose(platform, Vec3::X, Quat::IDENTITY);
    stepper.tick_step(1);
    // no fixed-time overstep: the previous step is displayed
    stepper.frame_step();
    let render = stepper.get::<KinematicRender>(character);
    assert!(render.position.abs_diff_eq(Vec3::Y, 1e-6));

    let frame = stepper.get::<FramePlatforms>(character);
    let pair = frame.pair(0.5).unwrap();
    assert!(pair.position().abs_diff_eq(Vec3::new(0.5, 1.0, 0.0), 1e-5));
}

#[test]
fn test_proxy_interpolates_snapshots() {
    let mut stepper = Stepper::new(PlatformConfig::default());
    let platform = stepper.spawn_platform(Vec3::new(5.0, 0.0, 0.0));
    let proxy = stepper.spawn_proxy();
    receive(&mut stepper, proxy, 10, snapshot_on(platform, Vec3::new(4.0, 0.0, 0.0), Vec3::Y));
    receive(&mut stepper, proxy, 12, snapshot_on(platform, Vec3::new(5.0, 0.0, 0.0), Vec3::Y));
    set_interpolation_time(&mut stepper, 11, 0.0);

    stepper.frame_step();
    // the platform pull is still fading in: the snapshots are displayed as is
    let render = stepper.get::<KinematicRender>(proxy);
    assert!(render.position.abs_diff_eq(Vec3::new(4.5, 1.0, 0.0), 1e-5));
    let interpolation = stepper.get::<SnapshotInterpolation>(proxy);
    approx::assert_relative_eq!(interpolation.pair.unwrap().alpha, 0.5);
    assert_eq!(stepper.get::<RenderPlatforms>(proxy).enters.len(), 1);
}

#[test]
fn test_proxy_is_pulled_to_live_platform() {
    let mut stepper = Stepper::default();
    let platform = stepper.spawn_platform(Vec3::new(5.0, 0.0, 0.0));
    let proxy = stepper.spawn_proxy();
    receive(&mut stepper, proxy, 10, snapshot_on(platform, Vec3::new(4.0, 0.0, 0.0), Vec3::Y));
    receive(&mut stepper, proxy, 12, snapshot_on(platform, Vec3::new(5.0, 0.0, 0.0), Vec3::Y));
    set_interpolation_time(&mut stepper, 11, 0.0);

    // instant render transitions: the live platform frame is used immediately
    stepper.frame_step();
    let render = stepper.get::<KinematicRender>(proxy);
    assert!(render.position.abs_diff_eq(Vec3::new(5.0, 1.0, 0.0), 1e-5));

    // the platform keeps moving ahead of the snapshots
    stepper.set_platform_pose(platform, Vec3::new(6.0, 0.0, 0.0), Quat::IDENTITY);
    stepper.frame_step();
    let render = stepper.get::<KinematicRender>(proxy);
    assert!(render.position.abs_diff_eq(Vec3::new(6.0, 1.0, 0.0), 1e-5));
}

#[test]
fn test_proxy_leaving_platform_fades_out() {
    let mut stepper = Stepper::new(
        PlatformConfig::default().with_render_durations(Duration::ZERO, Duration::ZERO),
    );
    let platform = stepper.spawn_platform(Vec3::new(5.0, 0.0, 0.0));
    let proxy = stepper.spawn_proxy();
    receive(&mut stepper, proxy, 10, snapshot_on(platform, Vec3::new(5.0, 0.0, 0.0), Vec3::Y));
    set_interpolation_time(&mut stepper, 10, 0.0);
    stepper.frame_step();
    assert_eq!(stepper.get::<RenderPlatforms>(proxy).enters.len(), 1);

    // the character jumped off: the platform is not in the snapshots anymore
    let world_snapshot = PlatformSnapshot {
        character: KinematicState::from_position(Vec3::new(0.0, 3.0, 0.0)),
        platforms: TrackedPlatforms::default(),
    };
    receive(&mut stepper, proxy, 11, world_snapshot);
    set_interpolation_time(&mut stepper, 11, 0.0);
    stepper.frame_step();
    let render_platforms = stepper.get::<RenderPlatforms>(proxy);
    assert!(render_platforms.enters.is_empty());
    assert_eq!(render_platforms.exits.len(), 1);

    stepper.frame_step();
    assert!(stepper.get::<RenderPlatforms>(proxy).exits.is_empty());
    let render = stepper.get::<KinematicRender>(proxy);
    assert!(render.position.abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-5));
}

#[test]
fn test_proxy_without_snapshots_renders_kinematic_state() {
    let mut stepper = Stepper::default();
    let proxy = stepper.spawn_proxy();
    stepper
        .world_mut()
        .entity_mut(proxy)
        .insert(KinematicState::from_position(Vec3::new(1.0, 2.0, 3.0)));
    stepper.frame_step();
    let render = stepper.get::<KinematicRender>(proxy);
    assert_eq!(render.position, Vec3::new(1.0, 2.0, 3.0));
}
