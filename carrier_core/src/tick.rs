use crate::wrapping_id;

// Internal id that tracks the simulation step
wrapping_id!(Tick);
