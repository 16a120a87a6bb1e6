//! # Carrier
//!
//! Carrier keeps characters attached to the moving platforms they stand on (elevators, moving
//! walkways, vehicles..) in a game that uses client-side prediction and snapshot interpolation.
//!
//! Add the [`CarrierPlugins`] to your app, insert [`Platform`](prelude::Platform) on the platforms
//! and [`PlatformRider`](prelude::PlatformRider) on the characters. Your character controller is
//! expected to:
//! - fill [`KinematicContacts`](prelude::KinematicContacts) with the entities overlapping the character
//! - run its own move in [`KinematicSystems::Move`](prelude::KinematicSystems::Move), reading and
//!   writing [`KinematicState`](prelude::KinematicState)
//! - skip the features listed in [`SuppressedFeatures`](prelude::SuppressedFeatures) for the step
//! - display [`KinematicRender`](prelude::KinematicRender)
#![cfg_attr(not(feature = "std"), no_std)]

pub mod plugins;

pub use plugins::CarrierPlugins;

#[doc(inline)]
pub use carrier_core;
#[doc(inline)]
pub use carrier_platforms;

pub mod prelude {
    pub use crate::plugins::CarrierPlugins;
    pub use carrier_core::prelude::*;
    pub use carrier_platforms::prelude::*;
}
