//! Contains a set of shared types: ticks, history buffers, clocks and the contract
//! with the character kinematic core.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod history_buffer;
pub mod kinematic;
pub mod plugin;
pub mod tick;
pub mod timeline;
pub mod wrapping_id;

#[doc(hidden)]
pub mod _reexport {
    pub use bevy_reflect;
    pub use paste::paste;
    pub use serde;
}

pub mod prelude {
    pub use crate::history_buffer::HistoryBuffer;
    pub use crate::kinematic::{
        KinematicContacts, KinematicFeature, KinematicMode, KinematicRender, KinematicState,
        SuppressedFeatures,
    };
    pub use crate::plugin::{CorePlugin, KinematicSystems};
    pub use crate::tick::Tick;
    pub use crate::timeline::{InterpolationTime, SimulationClock};
}
