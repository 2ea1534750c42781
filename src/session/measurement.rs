// Countdown and sampling loop
//
// Both loops are driven by the Clock so they run unchanged against the
// simulated clock. Time deltas fed to the pipeline are always the measured
// ones; the nominal interval only sizes the sleep.

use tracing::{debug, info};

use crate::analysis::MotionPipeline;
use crate::config::SamplingConfig;
use crate::error::RunError;
use crate::sensor::{ticks_diff, Accelerometer, Clock};
use crate::session::ui::{Progress, StatusDisplay, UserInput, UserSignal};

/// How a measuring phase ended
#[derive(Debug)]
pub enum MeasureOutcome {
    /// Duration elapsed; the pipeline holds the whole run
    Completed(MotionPipeline),
    /// Cancel was pressed; everything collected so far is dropped
    Cancelled,
}

/// Show `countdown_secs` digits, one per second.
///
/// Returns `false` if Cancel was pressed.
pub fn run_countdown<C, U, D>(
    clock: &C,
    input: &mut U,
    display: &mut D,
    countdown_secs: u32,
    poll_ms: u32,
) -> bool
where
    C: Clock + ?Sized,
    U: UserInput + ?Sized,
    D: StatusDisplay + ?Sized,
{
    let poll_ms = poll_ms.max(1);
    for remaining in (1..=countdown_secs).rev() {
        display.show_countdown(remaining);
        let second_start = clock.ticks_ms();
        while ticks_diff(clock.ticks_ms(), second_start) < 1000 {
            if input.poll() == Some(UserSignal::Cancel) {
                info!("[Countdown] Cancelled at {}", remaining);
                return false;
            }
            clock.sleep_ms(poll_ms);
        }
    }
    true
}

/// Sample until `duration_secs` have elapsed or Cancel is pressed.
///
/// One reading per iteration: read, filter, integrate, buffer, progress,
/// then sleep for the nominal interval minus the loop overhead. A sensor
/// failure ends the run with [`RunError::Sensor`].
pub fn measure<A, C, U, D>(
    sensor: &mut A,
    clock: &C,
    input: &mut U,
    display: &mut D,
    mut pipeline: MotionPipeline,
    duration_secs: u32,
    sampling: &SamplingConfig,
) -> Result<MeasureOutcome, RunError>
where
    A: Accelerometer + ?Sized,
    C: Clock + ?Sized,
    U: UserInput + ?Sized,
    D: StatusDisplay + ?Sized,
{
    let total_ms = duration_secs.saturating_mul(1000);
    let sleep_ms = sampling.sleep_ms();
    let start = clock.ticks_ms();
    let mut last = start;

    loop {
        if input.poll() == Some(UserSignal::Cancel) {
            info!(
                samples = pipeline.sample_count(),
                "[Measure] Cancelled, discarding run"
            );
            return Ok(MeasureOutcome::Cancelled);
        }

        let now = clock.ticks_ms();
        let elapsed_ms = ticks_diff(now, start);
        if elapsed_ms >= total_ms as i64 {
            break;
        }

        let dt_ms = ticks_diff(now, last);
        if dt_ms <= 0 {
            // same tick as the previous sample
            clock.sleep_ms(1);
            continue;
        }
        last = now;

        let raw = sensor.read_raw()?;
        pipeline.process(raw, dt_ms as u32, elapsed_ms as u32);
        display.show_progress(Progress {
            elapsed_ms: elapsed_ms as u32,
            total_ms,
        });

        clock.sleep_ms(sleep_ms);
    }

    display.show_progress(Progress {
        elapsed_ms: total_ms,
        total_ms,
    });
    debug!(
        samples = pipeline.sample_count(),
        buffered = pipeline.buffered().len(),
        "[Measure] Duration elapsed"
    );
    Ok(MeasureOutcome::Completed(pipeline))
}
