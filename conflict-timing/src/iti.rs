use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Source of inter-trial interval durations
pub trait IntervalSampler {
    fn next_interval<R: Rng>(&self, rng: &mut R) -> Duration;
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IntervalError {
    #[error("ITI mean must be positive and finite, got {0}")]
    InvalidMean(f64),
    #[error("ITI bounds must satisfy 0 <= min < max, got [{min}, {max}]")]
    InvalidBounds { min: f64, max: f64 },
}

/// Parameters of the truncated exponential, in seconds. Recorded with every
/// ITI as `ITIParams`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItiParams {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for ItiParams {
    fn default() -> Self {
        Self {
            mean: 0.5,
            min: 0.0,
            max: 5.0,
        }
    }
}

impl ItiParams {
    pub fn validate(&self) -> Result<(), IntervalError> {
        if !(self.mean.is_finite() && self.mean > 0.0) {
            return Err(IntervalError::InvalidMean(self.mean));
        }
        if !(self.min.is_finite() && self.max.is_finite() && 0.0 <= self.min && self.min < self.max)
        {
            return Err(IntervalError::InvalidBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Draws `-ln(U) * mean` and redraws until the value lands in `[min, max]`.
///
/// Callers must pass parameters that passed [`ItiParams::validate`];
/// otherwise the loop may never terminate.
pub fn sample_bounded_exponential<R: Rng>(rng: &mut R, mean: f64, min: f64, max: f64) -> f64 {
    let lambda = 1.0 / mean;
    let mut rejected = 0u32;
    loop {
        let u: f64 = rng.random();
        let sample = -u.ln() / lambda;
        if sample >= min && sample <= max {
            if rejected > 0 {
                tracing::trace!(rejected, sample, "ITI sample accepted after redraws");
            }
            return sample;
        }
        rejected += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedExponential {
    params: ItiParams,
}

impl BoundedExponential {
    pub fn new(params: ItiParams) -> Result<Self, IntervalError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> ItiParams {
        self.params
    }

    /// One interval in seconds.
    pub fn sample_secs<R: Rng>(&self, rng: &mut R) -> f64 {
        sample_bounded_exponential(rng, self.params.mean, self.params.min, self.params.max)
    }
}

impl Default for BoundedExponential {
    fn default() -> Self {
        Self {
            params: ItiParams::default(),
        }
    }
}

impl IntervalSampler for BoundedExponential {
    fn next_interval<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_secs_f64(self.sample_secs(rng))
    }
}
