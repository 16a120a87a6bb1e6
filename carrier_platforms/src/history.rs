//! Tick-indexed platform state used for reconciliation and interpolation.
//!
//! - [`PlatformHistory`]: authoritative slots recorded every tick by locally simulated characters,
//!   compared against the confirmed state to detect mispredictions
//! - [`PlatformSnapshots`]: snapshots received by proxies, bracketed at the interpolation time
//! - [`FramePlatforms`]: the last two fixed steps of a locally simulated character, interpolated
//!   with the fixed timestep overstep
use crate::config::PlatformConfig;
use crate::state::TrackedPlatforms;
use bevy_ecs::prelude::*;
use bevy_reflect::Reflect;
use carrier_core::history_buffer::HistoryBuffer;
use carrier_core::kinematic::{KinematicMode, KinematicState};
use carrier_core::tick::Tick;
use carrier_core::timeline::{InterpolationTime, SimulationClock};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Maximum difference between a recorded and a confirmed value that is not treated as a misprediction
pub const MISMATCH_TOLERANCE: f32 = 1e-4;

/// State of a character and its platforms at a given tick.
///
/// This is what the replication substrate delivers for each tick.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Reflect)]
pub struct PlatformSnapshot {
    pub character: KinematicState,
    pub platforms: TrackedPlatforms,
}

/// Two snapshots surrounding the render time, and the interpolation factor between them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotPair {
    pub from: PlatformSnapshot,
    pub to: PlatformSnapshot,
    /// Interpolation factor in `[0, 1]`
    pub alpha: f32,
}

impl SnapshotPair {
    /// Degenerate pair that always displays `snapshot`
    pub fn single(snapshot: PlatformSnapshot) -> Self {
        Self {
            from: snapshot,
            to: snapshot,
            alpha: 0.0,
        }
    }
}

/// Authoritative platform slots of a character, recorded every tick after the character moved
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct PlatformHistory {
    buffer: HistoryBuffer<TrackedPlatforms>,
}

impl PlatformHistory {
    /// Record the state for `tick`, keeping at most `max_len` ticks
    pub fn record(&mut self, tick: Tick, platforms: TrackedPlatforms, max_len: usize) {
        self.buffer.add_update(tick, platforms);
        self.buffer.truncate_oldest(max_len);
    }

    pub fn get(&self, tick: Tick) -> Option<&TrackedPlatforms> {
        self.buffer.get_exact(tick)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns true if the state recorded for `tick` is missing or differs from `confirmed`,
    /// in which case a rollback is needed
    pub fn check_confirmed(&self, tick: Tick, confirmed: &TrackedPlatforms) -> bool {
        self.get(tick)
            .is_none_or(|recorded| !recorded.approx_eq(confirmed, MISMATCH_TOLERANCE))
    }

    /// Return the state recorded for `tick` and discard every more recent entry,
    /// so that re-simulation records them again
    pub fn restore(&mut self, tick: Tick) -> Option<TrackedPlatforms> {
        self.buffer.clear_after_tick(tick);
        self.get(tick).copied()
    }
}

/// Compare the confirmed state of `tick` with the recorded one.
///
/// On mismatch the live slots and the history entry of `tick` are overwritten by the confirmed
/// state, the more recent entries are discarded and `true` is returned: the caller must
/// re-simulate from `tick`.
pub fn reconcile(
    platforms: &mut TrackedPlatforms,
    history: &mut PlatformHistory,
    tick: Tick,
    confirmed: &TrackedPlatforms,
) -> bool {
    if !history.check_confirmed(tick, confirmed) {
        trace!(?tick, "confirmed platform state matches the prediction");
        return false;
    }
    debug!(?tick, "platform state mispredicted, rolling back");
    history.buffer.clear_after_tick(tick);
    history.buffer.add_update(tick, *confirmed);
    *platforms = *confirmed;
    true
}

/// Snapshots received for a proxy character, ordered by tick
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct PlatformSnapshots {
    buffer: HistoryBuffer<PlatformSnapshot>,
}

impl PlatformSnapshots {
    pub fn receive(&mut self, tick: Tick, snapshot: PlatformSnapshot) {
        self.buffer.add_update(tick, snapshot);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Select the snapshots surrounding the interpolation time `tick + overstep`.
    ///
    /// - `from` is the most recent snapshot at or before `tick`, `to` the first one after it
    /// - if there is no `to`, the pair only displays `from`
    /// - if there is no `from` (the interpolation time is older than every snapshot), the pair
    ///   only displays the oldest snapshot
    ///
    /// Snapshots older than `from` are not needed anymore and are pruned.
    pub fn bracket(&mut self, tick: Tick, overstep: f32) -> Option<SnapshotPair> {
        let pair = match self.buffer.bracket(tick) {
            (Some((from_tick, from)), Some((to_tick, to))) => {
                let span = (*to_tick - *from_tick) as f32;
                let elapsed = (tick - *from_tick) as f32 + overstep;
                SnapshotPair {
                    from: *from,
                    to: *to,
                    alpha: (elapsed / span).clamp(0.0, 1.0),
                }
            }
            (Some((_, from)), None) => SnapshotPair::single(*from),
            (None, Some((_, to))) => SnapshotPair::single(*to),
            (None, None) => return None,
        };
        // keep `from`
        if let (Some((from_tick, _)), _) = self.buffer.bracket(tick) {
            let from_tick = *from_tick;
            self.buffer.clear_before_tick(from_tick);
        }
        Some(pair)
    }
}

/// Snapshot pair used to render a proxy character.
///
/// Filled from [`PlatformSnapshots`] at the [`InterpolationTime`]; it can also be written directly
/// by a replication substrate that runs its own interpolation timeline.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct SnapshotInterpolation {
    pub pair: Option<SnapshotPair>,
}

/// Last two fixed-step snapshots of a locally simulated character
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct FramePlatforms {
    pub previous: Option<PlatformSnapshot>,
    pub current: Option<PlatformSnapshot>,
}

impl FramePlatforms {
    pub fn push(&mut self, snapshot: PlatformSnapshot) {
        self.previous = self.current.replace(snapshot);
    }

    /// Pair interpolating between the previous and the current step
    pub fn pair(&self, overstep: f32) -> Option<SnapshotPair> {
        match (self.previous, self.current) {
            (Some(from), Some(to)) => Some(SnapshotPair {
                from,
                to,
                alpha: overstep.clamp(0.0, 1.0),
            }),
            (None, Some(current)) => Some(SnapshotPair::single(current)),
            _ => None,
        }
    }
}

/// Capture the post-move state of locally simulated characters
pub(crate) fn record_platforms_system(
    config: Res<PlatformConfig>,
    clock: Res<SimulationClock>,
    mut query: Query<(
        &KinematicMode,
        &KinematicState,
        &mut TrackedPlatforms,
        &mut PlatformHistory,
        &mut FramePlatforms,
    )>,
) {
    let tick = clock.tick();
    for (mode, state, mut tracked, mut history, mut frame) in query.iter_mut() {
        if !mode.is_simulated() {
            continue;
        }
        // the character moved: express its new state in the platform frames
        if tracked.is_tracking() {
            tracked.refresh_character(state);
        }
        history.record(tick, *tracked, config.history_ticks);
        frame.push(PlatformSnapshot {
            character: *state,
            platforms: *tracked,
        });
    }
}

/// Select the snapshots used to render proxy characters
pub(crate) fn select_snapshots_system(
    time: Res<InterpolationTime>,
    mut query: Query<(
        &KinematicMode,
        &mut PlatformSnapshots,
        &mut SnapshotInterpolation,
    )>,
) {
    for (mode, mut snapshots, mut interpolation) in query.iter_mut() {
        if mode.is_simulated() || snapshots.is_empty() {
            continue;
        }
        interpolation.pair = snapshots.bracket(time.tick, time.overstep);
    }
}
