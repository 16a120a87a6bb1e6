//! Listeners notified of the transform delta that platforms applied to a character.
//!
//! Typical listeners are cameras or attached props that must follow the character without
//! waiting for the next render interpolation.
use crate::error::{PlatformError, Result};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use bevy_ecs::entity::Entity;
use bevy_ecs::prelude::Component;
use bevy_math::{Quat, Vec3};
use carrier_core::kinematic::KinematicState;
use tracing::error;

/// Transform delta applied to a character during one simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformDelta {
    pub character: Entity,
    /// Kinematic state of the character after the delta was applied
    pub state: KinematicState,
    /// World-space displacement applied to the character
    pub position_delta: Vec3,
    /// World-space rotation applied to the look rotation of the character (yaw only)
    pub rotation_delta: Quat,
}

pub trait PlatformDeltaListener: Send + Sync + 'static {
    fn on_platform_delta(&mut self, delta: &PlatformDelta) -> Result<()>;
}

impl<F> PlatformDeltaListener for F
where
    F: FnMut(&PlatformDelta) -> Result<()> + Send + Sync + 'static,
{
    fn on_platform_delta(&mut self, delta: &PlatformDelta) -> Result<()> {
        self(delta)
    }
}

/// Listeners of a character, notified in insertion order
#[derive(Component, Default)]
pub struct PlatformDeltaListeners {
    listeners: Vec<Box<dyn PlatformDeltaListener>>,
}

impl core::fmt::Debug for PlatformDeltaListeners {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlatformDeltaListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

impl PlatformDeltaListeners {
    pub fn with(mut self, listener: impl PlatformDeltaListener) -> Self {
        self.add(listener);
        self
    }

    pub fn add(&mut self, listener: impl PlatformDeltaListener) {
        self.listeners.push(Box::new(listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Notify every listener.
    ///
    /// A listener that returns an error or panics is logged and does not prevent the other
    /// listeners from running. Returns the number of listeners that failed.
    pub fn notify(&mut self, delta: &PlatformDelta) -> usize {
        let mut failures = 0;
        for (index, listener) in self.listeners.iter_mut().enumerate() {
            if let Err(e) = notify_one(listener.as_mut(), delta) {
                error!(character = ?delta.character, index, "{e}");
                failures += 1;
            }
        }
        failures
    }
}

#[cfg(feature = "std")]
fn notify_one(listener: &mut dyn PlatformDeltaListener, delta: &PlatformDelta) -> Result<()> {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    catch_unwind(AssertUnwindSafe(|| listener.on_platform_delta(delta))).unwrap_or_else(|panic| {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| String::from(*s))
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "listener panicked".into());
        Err(PlatformError::Listener(message))
    })
}

#[cfg(not(feature = "std"))]
fn notify_one(listener: &mut dyn PlatformDeltaListener, delta: &PlatformDelta) -> Result<()> {
    listener.on_platform_delta(delta)
}
