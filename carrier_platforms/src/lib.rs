//! # Carrier Platforms
//!
//! Moving platforms carry the characters that stand on them.
//!
//! Each character tracks up to [`MAX_TRACKED_PLATFORMS`](state::MAX_TRACKED_PLATFORMS) platforms.
//! Every fixed step:
//! - [`lifecycle`]: the overlapping platforms are diffed against the tracked ones, and the blend
//!   alpha of each platform moves toward 1 (in contact) or 0 (left)
//! - [`propagate`]: the motion of the active platforms since the previous step is applied to
//!   the character, and listeners are notified
//! - [`history`]: after the character moved, the platform state is recorded for reconciliation
//!   and render interpolation
//!
//! At render time ([`render`]) the character position is reconstructed in platform space, so that
//! characters riding a platform do not lag behind it.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod blend;
pub mod config;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod listener;
pub mod platform;
pub mod plugin;
pub mod propagate;
pub mod registry;
pub mod render;
pub mod state;

pub mod prelude {
    pub use crate::blend::{blend_position, blend_velocity};
    pub use crate::config::PlatformConfig;
    pub use crate::error::PlatformError;
    pub use crate::history::{
        FramePlatforms, PlatformHistory, PlatformSnapshot, PlatformSnapshots,
        SnapshotInterpolation, SnapshotPair, reconcile,
    };
    pub use crate::listener::{PlatformDelta, PlatformDeltaListener, PlatformDeltaListeners};
    pub use crate::platform::{Platform, PlatformLookup, PlatformPose};
    pub use crate::plugin::{PlatformPlugin, PlatformRider};
    pub use crate::propagate::PlatformMotion;
    pub use crate::registry::OverlappingPlatforms;
    pub use crate::render::{PlatformEnter, PlatformExit, RenderPlatforms};
    pub use crate::state::{
        MAX_TRACKED_PLATFORMS, PlatformLifecycle, TrackedPlatform, TrackedPlatforms,
    };
}
