//! Defines the [`CarrierPlugins`] plugin group
use bevy_app::{PluginGroup, PluginGroupBuilder};
use carrier_core::plugin::CorePlugin;
use carrier_core::timeline::SimulationClock;
use carrier_platforms::config::PlatformConfig;
use carrier_platforms::plugin::PlatformPlugin;
use core::time::Duration;

/// A plugin group containing all the carrier plugins.
///
/// By default, the following plugins will be added:
/// - [`CorePlugin`]: the simulation clock and the ordering of the [`KinematicSystems`](carrier_core::plugin::KinematicSystems)
/// - [`PlatformPlugin`]: platform tracking for characters with a [`PlatformRider`](carrier_platforms::plugin::PlatformRider)
pub struct CarrierPlugins {
    /// Duration of a fixed simulation step
    pub tick_duration: Duration,
    pub config: PlatformConfig,
}

impl Default for CarrierPlugins {
    fn default() -> Self {
        Self {
            tick_duration: SimulationClock::default().tick_duration,
            config: PlatformConfig::default(),
        }
    }
}

impl PluginGroup for CarrierPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(CorePlugin {
                tick_duration: self.tick_duration,
            })
            .add(PlatformPlugin::new(self.config))
    }
}
