// Virtual clock and synthetic accelerometer

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SensorError;
use crate::sensor::{Accelerometer, Axes, Clock, RawAccel};

struct Jitter {
    rng: StdRng,
    max_ms: u32,
}

/// Shared virtual millisecond counter.
///
/// Clones share the same time. `sleep_ms` advances the counter, optionally
/// adding a seeded random overrun of up to `max_ms`.
#[derive(Clone)]
pub struct SimulatedClock {
    now: Rc<Cell<u32>>,
    jitter: Option<Rc<RefCell<Jitter>>>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(ticks: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(ticks)),
            jitter: None,
        }
    }

    /// Every sleep overruns by a random 0..=max_ms.
    pub fn with_jitter(mut self, max_ms: u32, seed: u64) -> Self {
        self.jitter = Some(Rc::new(RefCell::new(Jitter {
            rng: StdRng::seed_from_u64(seed),
            max_ms,
        })));
        self
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulatedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedClock")
            .field("now", &self.now.get())
            .field("jitter", &self.jitter.is_some())
            .finish()
    }
}

impl Clock for SimulatedClock {
    fn ticks_ms(&self) -> u32 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: u32) {
        let extra = match &self.jitter {
            Some(jitter) => {
                let mut jitter = jitter.borrow_mut();
                let max_ms = jitter.max_ms;
                jitter.rng.gen_range(0..=max_ms)
            }
            None => 0,
        };
        self.advance(ms.saturating_add(extra));
    }
}

/// True motion applied on top of gravity, in m/s², by clock time.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionProfile {
    /// Device at rest
    Rest,
    /// Constant acceleration from `onset_ms` on
    Step { accel: Axes, onset_ms: u32 },
    /// Acceleration whose integral saturates at `vmax` with time constant
    /// `tau_s` along `axis`: `a(t) = vmax / tau_s * exp(-t / tau_s)`
    Saturating {
        vmax: f64,
        tau_s: f64,
        axis: usize,
        onset_ms: u32,
    },
}

impl MotionProfile {
    pub fn accel_at(&self, ticks_ms: u32) -> Axes {
        match *self {
            MotionProfile::Rest => [0.0; 3],
            MotionProfile::Step { accel, onset_ms } => {
                if ticks_ms >= onset_ms {
                    accel
                } else {
                    [0.0; 3]
                }
            }
            MotionProfile::Saturating {
                vmax,
                tau_s,
                axis,
                onset_ms,
            } => {
                let mut accel = [0.0; 3];
                if ticks_ms >= onset_ms && tau_s > 0.0 && axis < 3 {
                    let t = (ticks_ms - onset_ms) as f64 / 1000.0;
                    accel[axis] = vmax / tau_s * (-t / tau_s).exp();
                }
                accel
            }
        }
    }
}

/// Accelerometer producing `gravity + profile(t)` quantized to counts.
pub struct SyntheticAccelerometer {
    clock: SimulatedClock,
    gravity: Axes,
    profile: MotionProfile,
    scale: f64,
    noise: Option<(StdRng, f64)>,
    fail_after: Option<u64>,
    reads: u64,
}

impl SyntheticAccelerometer {
    pub fn new(clock: SimulatedClock, gravity: Axes, profile: MotionProfile, scale: f64) -> Self {
        Self {
            clock,
            gravity,
            profile,
            scale,
            noise: None,
            fail_after: None,
            reads: 0,
        }
    }

    /// Uniform noise in ±`amplitude` m/s² on every axis.
    pub fn with_noise(mut self, amplitude: f64, seed: u64) -> Self {
        self.noise = Some((StdRng::seed_from_u64(seed), amplitude.abs()));
        self
    }

    /// Fail every read after `reads` successful ones.
    pub fn fail_after(mut self, reads: u64) -> Self {
        self.fail_after = Some(reads);
        self
    }

    pub fn set_gravity(&mut self, gravity: Axes) {
        self.gravity = gravity;
    }

    pub fn set_profile(&mut self, profile: MotionProfile) {
        self.profile = profile;
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl Accelerometer for SyntheticAccelerometer {
    fn read_raw(&mut self) -> Result<RawAccel, SensorError> {
        if let Some(limit) = self.fail_after {
            if self.reads >= limit {
                return Err(SensorError::ReadFailed {
                    details: format!("synthetic failure after {} reads", limit),
                });
            }
        }
        self.reads += 1;

        let motion = self.profile.accel_at(self.clock.ticks_ms());
        let mut counts = [0i32; 3];
        for (axis, count) in counts.iter_mut().enumerate() {
            let mut accel = self.gravity[axis] + motion[axis];
            if let Some((rng, amplitude)) = self.noise.as_mut() {
                if *amplitude > 0.0 {
                    accel += rng.gen_range(-*amplitude..=*amplitude);
                }
            }
            *count = (accel / self.scale).round() as i32;
        }
        Ok(RawAccel::new(counts[0], counts[1], counts[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: f64 = 0.009_806_65;

    #[test]
    fn test_clones_share_time() {
        let clock = SimulatedClock::new();
        let other = clock.clone();
        clock.sleep_ms(25);
        assert_eq!(other.ticks_ms(), 25);
    }

    #[test]
    fn test_jitter_is_bounded_and_seeded() {
        let a = SimulatedClock::new().with_jitter(3, 7);
        let b = SimulatedClock::new().with_jitter(3, 7);
        for _ in 0..100 {
            let before = a.ticks_ms();
            a.sleep_ms(10);
            b.sleep_ms(10);
            let step = a.ticks_ms() - before;
            assert!((10..=13).contains(&step));
        }
        assert_eq!(a.ticks_ms(), b.ticks_ms());
    }

    #[test]
    fn test_rest_reads_gravity_in_counts() {
        let clock = SimulatedClock::new();
        let mut sensor =
            SyntheticAccelerometer::new(clock, [0.0, 0.0, -9.806_65], MotionProfile::Rest, SCALE);
        assert_eq!(sensor.read_raw().unwrap(), RawAccel::new(0, 0, -1000));
    }

    #[test]
    fn test_step_starts_at_onset() {
        let clock = SimulatedClock::new();
        let profile = MotionProfile::Step {
            accel: [0.980_665, 0.0, 0.0],
            onset_ms: 100,
        };
        let mut sensor = SyntheticAccelerometer::new(clock.clone(), [0.0; 3], profile, SCALE);

        assert_eq!(sensor.read_raw().unwrap().x, 0);
        clock.advance(100);
        assert_eq!(sensor.read_raw().unwrap().x, 100);
    }

    #[test]
    fn test_saturating_profile_decays() {
        let profile = MotionProfile::Saturating {
            vmax: 2.0,
            tau_s: 0.5,
            axis: 1,
            onset_ms: 0,
        };
        assert!((profile.accel_at(0)[1] - 4.0).abs() < 1e-12);
        assert!(profile.accel_at(5000)[1] < 1e-3);
        assert_eq!(profile.accel_at(0)[0], 0.0);
    }

    #[test]
    fn test_fail_after() {
        let clock = SimulatedClock::new();
        let mut sensor =
            SyntheticAccelerometer::new(clock, [0.0; 3], MotionProfile::Rest, SCALE).fail_after(2);
        assert!(sensor.read_raw().is_ok());
        assert!(sensor.read_raw().is_ok());
        assert!(matches!(
            sensor.read_raw(),
            Err(SensorError::ReadFailed { .. })
        ));
    }
}
