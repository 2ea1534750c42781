//! Decimated velocity trace used as fit input.

use serde::{Deserialize, Serialize};

/// One retained point of the velocity trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocitySample {
    /// Seconds since measuring started
    pub t: f64,
    /// |v| in m/s
    pub v: f64,
}

/// Keeps sample 0 and every `factor`-th sample after it.
#[derive(Debug, Clone)]
pub struct DecimatedBuffer {
    factor: usize,
    seen: u64,
    samples: Vec<VelocitySample>,
}

impl DecimatedBuffer {
    /// A factor of 0 is treated as 1 (keep everything).
    pub fn new(factor: usize) -> Self {
        Self {
            factor: factor.max(1),
            seen: 0,
            samples: Vec::new(),
        }
    }

    /// Offer the next sample; returns whether it was kept.
    pub fn push(&mut self, t: f64, v: f64) -> bool {
        let keep = self.seen % self.factor as u64 == 0;
        if keep {
            self.samples.push(VelocitySample { t, v });
        }
        self.seen += 1;
        keep
    }

    /// Number of samples offered, kept or not
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[VelocitySample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<VelocitySample> {
        self.samples
    }
}
