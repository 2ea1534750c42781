// Scripted buttons and a display that records what it was asked to show

use std::collections::VecDeque;

use crate::sensor::{ticks_diff, Clock};
use crate::session::{Progress, ResultPage, StatusDisplay, UserInput, UserSignal};
use crate::testing::SimulatedClock;

/// Button presses released at fixed virtual times.
///
/// A press becomes visible once the clock reaches its time and is returned
/// by exactly one `poll`. Presses are released in script order.
#[derive(Debug)]
pub struct ScriptedInput {
    clock: SimulatedClock,
    script: VecDeque<(u32, UserSignal)>,
}

impl ScriptedInput {
    pub fn new(clock: SimulatedClock, script: Vec<(u32, UserSignal)>) -> Self {
        Self {
            clock,
            script: script.into(),
        }
    }

    pub fn push(&mut self, at_ms: u32, signal: UserSignal) {
        self.script.push_back((at_ms, signal));
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl UserInput for ScriptedInput {
    fn poll(&mut self) -> Option<UserSignal> {
        let (at_ms, _) = *self.script.front()?;
        if ticks_diff(self.clock.ticks_ms(), at_ms) >= 0 {
            self.script.pop_front().map(|(_, signal)| signal)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Duration(u32),
    Calibrating,
    Countdown(u32),
    Progress(Progress),
    Result(ResultPage, String),
    Clear,
}

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub events: Vec<DisplayEvent>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn countdowns(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DisplayEvent::Countdown(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn durations(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DisplayEvent::Duration(secs) => Some(*secs),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DisplayEvent::Result(_, text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_progress(&self) -> Option<Progress> {
        self.events.iter().rev().find_map(|event| match event {
            DisplayEvent::Progress(progress) => Some(*progress),
            _ => None,
        })
    }
}

impl StatusDisplay for RecordingDisplay {
    fn show_duration(&mut self, secs: u32) {
        self.events.push(DisplayEvent::Duration(secs));
    }

    fn show_calibrating(&mut self) {
        self.events.push(DisplayEvent::Calibrating);
    }

    fn show_countdown(&mut self, remaining_secs: u32) {
        self.events.push(DisplayEvent::Countdown(remaining_secs));
    }

    fn show_progress(&mut self, progress: Progress) {
        self.events.push(DisplayEvent::Progress(progress));
    }

    fn show_result(&mut self, page: ResultPage, text: &str) {
        self.events.push(DisplayEvent::Result(page, text.to_string()));
    }

    fn clear(&mut self) {
        self.events.push(DisplayEvent::Clear);
    }
}
