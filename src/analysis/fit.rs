//! Saturating-exponential fit of the velocity trace
//!
//! Estimates `(vmax, tau)` for `v(t) = vmax * (1 - exp(-t / tau))` in two
//! stages:
//!
//! 1. `vmax` is the largest observed velocity.
//! 2. `tau` comes from the exact linearization
//!    `ln(1 - v / vmax) = -t / tau`, fitted by least squares through the
//!    origin over every point strictly below `vmax`.
//!
//! There is no iterative refinement. The estimate is only as good as the
//! observed peak is as a stand-in for the asymptote, so a trace that has not
//! saturated (e.g. a linear ramp) yields a biased `tau`.
//!
//! A `tau` of exactly `0.0` means the fit was not computable (fewer than two
//! usable points, or a flat slope). It is a sentinel, not an error.

use serde::{Deserialize, Serialize};

use crate::analysis::decimation::VelocitySample;
use crate::config::FitConfig;

/// Fitted model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Asymptotic velocity in m/s
    pub vmax: f64,
    /// Time constant in seconds; 0.0 when not computable
    pub tau: f64,
}

impl FitResult {
    pub fn is_degenerate(&self) -> bool {
        self.tau == 0.0
    }

    /// Model velocity at `t` seconds; the ramp is undefined for a degenerate fit.
    pub fn predict(&self, t: f64) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        Some(self.vmax * (1.0 - (-t / self.tau).exp()))
    }
}

/// Largest velocity in the trace, or `None` for an empty trace.
pub fn peak_velocity(samples: &[VelocitySample]) -> Option<f64> {
    samples
        .iter()
        .map(|s| s.v)
        .filter(|v| v.is_finite())
        .fold(None, |peak: Option<f64>, v| Some(peak.map_or(v, |p| p.max(v))))
}

/// Origin-constrained least-squares slope of `ln(1 - v/vmax)` against `t`.
///
/// Returns `None` when no point contributes (`sum t² == 0`).
pub fn linearized_slope(samples: &[VelocitySample], vmax: f64) -> Option<f64> {
    let mut sum_t2 = 0.0;
    let mut sum_t_ln = 0.0;

    for sample in samples {
        // ln(0) at the peak itself
        if sample.v >= vmax {
            continue;
        }
        let r = 1.0 - sample.v / vmax;
        if r <= 0.0 {
            continue;
        }
        sum_t2 += sample.t * sample.t;
        sum_t_ln += sample.t * r.ln();
    }

    if sum_t2 == 0.0 {
        None
    } else {
        Some(sum_t_ln / sum_t2)
    }
}

/// Fit `(vmax, tau)` to a velocity trace.
///
/// A trace whose peak is at or below `vmax_epsilon` never moved: `vmax` is
/// reported as `vmax_floor` and `tau` as the 0.0 sentinel.
pub fn fit_exponential(samples: &[VelocitySample], config: &FitConfig) -> FitResult {
    let vmax = match peak_velocity(samples) {
        Some(peak) if peak > config.vmax_epsilon => peak,
        _ => {
            return FitResult {
                vmax: config.vmax_floor,
                tau: 0.0,
            }
        }
    };

    let tau = match linearized_slope(samples, vmax) {
        Some(slope) if slope != 0.0 => -1.0 / slope,
        _ => 0.0,
    };

    FitResult { vmax, tau }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planted(vmax: f64, tau: f64, duration: f64, step: f64) -> Vec<VelocitySample> {
        let n = (duration / step).round() as usize;
        (0..=n)
            .map(|i| {
                let t = i as f64 * step;
                VelocitySample {
                    t,
                    v: vmax * (1.0 - (-t / tau).exp()),
                }
            })
            .collect()
    }

    #[test]
    fn test_recovers_planted_parameters() {
        let config = FitConfig::default();
        let samples = planted(3.0, 0.25, 10.0, 0.1);

        let fit = fit_exponential(&samples, &config);
        assert!((fit.vmax - 3.0).abs() / 3.0 < 1e-6);
        assert!((fit.tau - 0.25).abs() / 0.25 < 0.01, "tau was {}", fit.tau);
    }

    #[test]
    fn test_recovers_slower_time_constant_with_long_trace() {
        let config = FitConfig::default();
        let samples = planted(2.0, 0.5, 20.0, 0.1);

        let fit = fit_exponential(&samples, &config);
        assert!((fit.tau - 0.5).abs() / 0.5 < 0.01, "tau was {}", fit.tau);
    }

    #[test]
    fn test_unsaturated_trace_underestimates_tau() {
        // Only one time constant observed: the peak is far from the asymptote
        let config = FitConfig::default();
        let samples = planted(2.0, 1.0, 1.0, 0.05);

        let fit = fit_exponential(&samples, &config);
        assert!(fit.vmax < 1.3);
        assert!(fit.tau > 0.0 && fit.tau < 1.0);
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let config = FitConfig::default();
        let fit = fit_exponential(&[VelocitySample { t: 0.5, v: 1.0 }], &config);
        assert_eq!(fit.vmax, 1.0);
        assert_eq!(fit.tau, 0.0);
        assert!(fit.is_degenerate());
        assert_eq!(fit.predict(1.0), None);
    }

    #[test]
    fn test_only_origin_point_is_degenerate() {
        let config = FitConfig::default();
        let samples = [
            VelocitySample { t: 0.0, v: 0.0 },
            VelocitySample { t: 0.1, v: 1.0 },
        ];
        assert_eq!(fit_exponential(&samples, &config).tau, 0.0);
    }

    #[test]
    fn test_empty_and_flat_traces_use_floor() {
        let config = FitConfig::default();

        let fit = fit_exponential(&[], &config);
        assert_eq!(fit.vmax, config.vmax_floor);
        assert_eq!(fit.tau, 0.0);

        let flat = [
            VelocitySample { t: 0.0, v: 0.0 },
            VelocitySample { t: 1.0, v: 0.0 },
        ];
        let fit = fit_exponential(&flat, &config);
        assert_eq!(fit.vmax, config.vmax_floor);
        assert_eq!(fit.tau, 0.0);

        // rounding residue from a resting run is still "no motion"
        let residue = [
            VelocitySample { t: 0.0, v: 0.0 },
            VelocitySample { t: 1.0, v: 1e-15 },
            VelocitySample { t: 2.0, v: 3e-15 },
        ];
        let fit = fit_exponential(&residue, &config);
        assert_eq!(fit.vmax, config.vmax_floor);
        assert_eq!(fit.tau, 0.0);
    }

    #[test]
    fn test_peak_velocity() {
        assert_eq!(peak_velocity(&[]), None);
        let samples = [
            VelocitySample { t: 0.0, v: 0.2 },
            VelocitySample { t: 0.1, v: 0.7 },
            VelocitySample { t: 0.2, v: 0.5 },
        ];
        assert_eq!(peak_velocity(&samples), Some(0.7));
    }

    #[test]
    fn test_points_at_peak_are_skipped() {
        let samples = [
            VelocitySample { t: 1.0, v: 0.5 },
            VelocitySample { t: 2.0, v: 1.0 },
            VelocitySample { t: 3.0, v: 1.0 },
        ];
        let slope = linearized_slope(&samples, 1.0).unwrap();
        assert!((slope - 0.5_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_predict_follows_model() {
        let fit = FitResult {
            vmax: 2.0,
            tau: 0.5,
        };
        let v = fit.predict(0.5).unwrap();
        assert!((v - 2.0 * (1.0 - (-1.0_f64).exp())).abs() < 1e-12);
    }
}
