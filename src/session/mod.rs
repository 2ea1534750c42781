// Session module - the run lifecycle around the motion pipeline
//
// MotionSession owns the hardware seams (sensor, clock, buttons, display,
// radio) and walks one cycle of the state machine per `run_cycle` call:
//
//   select duration -> calibrate -> countdown -> measure -> report
//
// Every run builds a fresh MotionPipeline from fresh offsets; nothing from a
// previous run (cancelled, failed or reported) is reused.

use tracing::{info, warn};

use crate::analysis::{MotionPipeline, PipelineConfig, RunSummary};
use crate::calibration::run_calibration;
use crate::config::AppConfig;
use crate::error::{log_run_error, ConfigError, RunError};
use crate::sensor::{Accelerometer, Clock};
use crate::telemetry::{Radio, TelemetryEmitter};

pub mod measurement;
pub mod state;
pub mod ui;

pub use measurement::{measure, run_countdown, MeasureOutcome};
pub use state::{SessionEvent, SessionState};
pub use ui::{
    DurationMenu, LogDisplay, Progress, ResultPage, StatusDisplay, UserInput, UserSignal,
};

/// How one pass through the state machine ended
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Run completed; telemetry was emitted once
    Reported(RunSummary),
    /// Cancelled during countdown or measuring
    Cancelled,
    /// Run aborted without a result; no telemetry
    Failed(RunError),
}

pub struct MotionSession<A, C, U, D, R> {
    config: AppConfig,
    sensor: A,
    clock: C,
    input: U,
    display: D,
    emitter: TelemetryEmitter<R>,
    menu: DurationMenu,
    state: SessionState,
}

impl<A, C, U, D, R> MotionSession<A, C, U, D, R>
where
    A: Accelerometer,
    C: Clock,
    U: UserInput,
    D: StatusDisplay,
    R: Radio,
{
    /// Build a session; the configuration is validated up front.
    pub fn new(
        config: AppConfig,
        sensor: A,
        clock: C,
        input: U,
        display: D,
        radio: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            menu: DurationMenu::new(config.session.durations_secs.clone()),
            config,
            sensor,
            clock,
            input,
            display,
            emitter: TelemetryEmitter::new(radio),
            state: SessionState::SelectDuration,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sensor_mut(&mut self) -> &mut A {
        &mut self.sensor
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn emitter(&self) -> &TelemetryEmitter<R> {
        &self.emitter
    }

    /// One full cycle: wait for a duration, then run it.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let secs = self.select_duration();
        self.run_measurement(secs)
    }

    /// Calibrate, count down, measure `duration_secs` and report.
    ///
    /// Starts from duration selection and always ends back there.
    pub fn run_measurement(&mut self, duration_secs: u32) -> CycleOutcome {
        self.advance(SessionEvent::DurationConfirmed);
        match self.run_phases(duration_secs) {
            Ok(Some(summary)) => CycleOutcome::Reported(summary),
            Ok(None) => {
                self.advance(SessionEvent::Cancelled);
                self.display.clear();
                CycleOutcome::Cancelled
            }
            Err(err) => {
                log_run_error(&err, "MotionSession::run_measurement");
                self.advance(SessionEvent::RunFailed);
                self.display.clear();
                CycleOutcome::Failed(err)
            }
        }
    }

    fn run_phases(&mut self, duration_secs: u32) -> Result<Option<RunSummary>, RunError> {
        if duration_secs == 0 {
            return Err(RunError::InvalidDuration {
                secs: duration_secs,
            });
        }

        self.display.show_calibrating();
        let offsets = run_calibration(
            &mut self.sensor,
            &self.clock,
            self.config.calibration.samples,
            self.config.sampling.interval_ms(),
            self.config.sampling.scale,
        )?;
        self.advance(SessionEvent::CalibrationComplete);

        if !run_countdown(
            &self.clock,
            &mut self.input,
            &mut self.display,
            self.config.session.countdown_secs,
            self.config.sampling.interval_ms(),
        ) {
            return Ok(None);
        }
        self.advance(SessionEvent::CountdownComplete);

        let pipeline = MotionPipeline::new(offsets, PipelineConfig::from(&self.config));
        let pipeline = match measure(
            &mut self.sensor,
            &self.clock,
            &mut self.input,
            &mut self.display,
            pipeline,
            duration_secs,
            &self.config.sampling,
        )? {
            MeasureOutcome::Completed(pipeline) => pipeline,
            MeasureOutcome::Cancelled => return Ok(None),
        };
        self.advance(SessionEvent::DurationElapsed);

        let summary = pipeline.finish(duration_secs)?;
        info!(
            samples = summary.sample_count,
            mean_accel = summary.mean_accel,
            mean_velocity = summary.mean_velocity,
            vmax = summary.fit.vmax,
            tau = summary.fit.tau,
            "[Session] Run complete"
        );
        self.emitter.emit(&summary);
        self.show_results(&summary);
        self.advance(SessionEvent::Restart);
        Ok(Some(summary))
    }

    /// Block on the menu until Confirm.
    fn select_duration(&mut self) -> u32 {
        self.menu.reset();
        let mut shown = self.menu.current();
        if let Some(secs) = shown {
            self.display.show_duration(secs);
        }

        loop {
            let current = match self.input.poll() {
                Some(UserSignal::Next) => self.menu.next(),
                Some(UserSignal::Previous) => self.menu.previous(),
                Some(UserSignal::Confirm) => {
                    let secs = self.menu.current().unwrap_or(0);
                    info!("[Session] Selected {} s", secs);
                    return secs;
                }
                _ => {
                    self.clock.sleep_ms(self.config.session.menu_poll_ms);
                    continue;
                }
            };
            if current != shown {
                shown = current;
                if let Some(secs) = current {
                    self.display.show_duration(secs);
                }
            }
        }
    }

    /// Cycle the result pages; Cancel is checked after each full cycle.
    fn show_results(&mut self, summary: &RunSummary) {
        loop {
            for page in ResultPage::CYCLE {
                self.display.show_result(page, &page.render(summary));
                self.clock.sleep_ms(self.config.session.result_page_ms);
            }
            while let Some(signal) = self.input.poll() {
                if signal == UserSignal::Cancel {
                    self.display.clear();
                    return;
                }
            }
        }
    }

    fn advance(&mut self, event: SessionEvent) {
        match self.state.on(event) {
            Some(next) => {
                info!("[Session] {} -> {} ({:?})", self.state, next, event);
                self.state = next;
            }
            None => warn!("[Session] Ignoring {:?} in state {}", event, self.state),
        }
    }
}
