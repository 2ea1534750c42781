//! Simulated hardware for tests and the `simulate` CLI command.
//!
//! Everything here runs on a virtual millisecond counter: [`SimulatedClock`]
//! only advances when something sleeps on it, so a 40 s session completes
//! instantly and deterministically. Devices that depend on time hold a clone
//! of the clock and read the shared counter.

pub mod devices;
pub mod scripted;

pub use devices::{MotionProfile, SimulatedClock, SyntheticAccelerometer};
pub use scripted::{DisplayEvent, RecordingDisplay, ScriptedInput};
