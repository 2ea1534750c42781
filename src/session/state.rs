// Session state machine - explicit transition table
//
// SelectDuration -> Calibrating -> Countdown -> Measuring -> Reporting
//        ^______________________________________________________|
//
// Cancel during Countdown or Measuring, and any failed run, go straight back
// to SelectDuration so the next run starts with a fresh calibration.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    SelectDuration,
    Calibrating,
    Countdown,
    Measuring,
    Reporting,
}

/// Events that move the session between states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// User picked a duration
    DurationConfirmed,
    /// Offsets are ready
    CalibrationComplete,
    /// Countdown reached zero
    CountdownComplete,
    /// Elapsed time reached the selected duration
    DurationElapsed,
    /// User cancel signal
    Cancelled,
    /// Sensor failure or degenerate run
    RunFailed,
    /// User restart signal while results are shown
    Restart,
}

impl SessionState {
    /// Next state for `event`, or `None` if the event is not accepted here.
    pub fn on(self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (SelectDuration, DurationConfirmed) => Some(Calibrating),
            (Calibrating, CalibrationComplete) => Some(Countdown),
            (Calibrating, RunFailed) => Some(SelectDuration),
            (Countdown, CountdownComplete) => Some(Measuring),
            (Countdown, Cancelled) => Some(SelectDuration),
            (Measuring, DurationElapsed) => Some(Reporting),
            (Measuring, Cancelled) => Some(SelectDuration),
            (Measuring, RunFailed) => Some(SelectDuration),
            (Reporting, Restart) => Some(SelectDuration),
            (Reporting, RunFailed) => Some(SelectDuration),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::SelectDuration => "SELECT",
            SessionState::Calibrating => "CALIBRATING",
            SessionState::Countdown => "COUNTDOWN",
            SessionState::Measuring => "MEASURING",
            SessionState::Reporting => "REPORTING",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
