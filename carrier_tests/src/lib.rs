//! # Carrier Tests
//!
//! App-level tests for the carrier crates, driven by a [`Stepper`](stepper::Stepper)
//! that runs the fixed and render schedules explicitly.
extern crate alloc;

pub mod stepper;

#[cfg(test)]
mod platforms;
