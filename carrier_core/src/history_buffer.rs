use crate::tick::Tick;
use alloc::collections::VecDeque;
use tracing::{debug, trace};

/// HistoryBuffer stores past values (usually of a Component) in a buffer, to allow for rollback
/// and for interpolation between snapshots.
/// The values must always remain ordered from oldest (front) to most recent (back)
#[derive(Debug, Clone)]
pub struct HistoryBuffer<R> {
    // Queue containing the history of the value.
    // The front contains old elements, the back contains the more recent elements.
    pub(crate) buffer: VecDeque<(Tick, R)>,
}

impl<R> Default for HistoryBuffer<R> {
    fn default() -> Self {
        Self {
            buffer: VecDeque::new(),
        }
    }
}

// This is mostly present for testing, we only compare the buffer ticks, not the values
impl<R> PartialEq for HistoryBuffer<R> {
    fn eq(&self, other: &Self) -> bool {
        self.buffer
            .iter()
            .map(|(tick, _)| *tick)
            .eq(other.buffer.iter().map(|(tick, _)| *tick))
    }
}

impl<R> HistoryBuffer<R> {
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the value that was recorded exactly at the specified tick.
    pub fn get_exact(&self, tick: Tick) -> Option<&R> {
        self.buffer
            .iter()
            .rev()
            .find(|(buffer_tick, _)| *buffer_tick == tick)
            .map(|(_, value)| value)
    }

    /// Return the entries surrounding `tick`:
    /// - the most recent entry at or before `tick`
    /// - the oldest entry strictly after `tick`
    pub fn bracket(&self, tick: Tick) -> (Option<&(Tick, R)>, Option<&(Tick, R)>) {
        let partition = self
            .buffer
            .partition_point(|(buffer_tick, _)| *buffer_tick <= tick);
        let start = partition.checked_sub(1).and_then(|idx| self.buffer.get(idx));
        (start, self.buffer.get(partition))
    }

    /// Clear all the values in the history buffer that are strictly older than the specified tick
    pub fn clear_before_tick(&mut self, tick: Tick) {
        let partition = self
            .buffer
            .partition_point(|(buffer_tick, _)| *buffer_tick < tick);
        self.buffer.drain(0..partition);
    }

    /// Clear all the values in the history buffer that are strictly more recent than the specified tick
    pub fn clear_after_tick(&mut self, tick: Tick) {
        let partition = self
            .buffer
            .partition_point(|(buffer_tick, _)| *buffer_tick <= tick);
        self.buffer.truncate(partition);
    }

    /// Add a value to the history buffer.
    ///
    /// If a value already exists for that tick, it is replaced.
    /// Values older than the most recent one are inserted at their ordered position.
    pub fn add_update(&mut self, tick: Tick, value: R) {
        if let Some(last_tick) = self.buffer.back().map(|(tick, _)| *tick) {
            if last_tick == tick {
                trace!(?tick, "replacing history value recorded for the same tick");
                self.buffer.pop_back();
            } else if last_tick > tick {
                debug!(
                    ?tick,
                    ?last_tick,
                    "inserting a value older than the most recent history entry"
                );
                let partition = self
                    .buffer
                    .partition_point(|(buffer_tick, _)| *buffer_tick < tick);
                if self
                    .buffer
                    .get(partition)
                    .is_some_and(|(buffer_tick, _)| *buffer_tick == tick)
                {
                    self.buffer.remove(partition);
                }
                self.buffer.insert(partition, (tick, value));
                return;
            }
        }
        self.buffer.push_back((tick, value));
    }

    /// Only keep the `max_len` most recent values
    pub fn truncate_oldest(&mut self, max_len: usize) {
        let excess = self.buffer.len().saturating_sub(max_len);
        self.buffer.drain(0..excess);
    }
}
