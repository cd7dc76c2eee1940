pub mod durations;
pub mod iti;

pub use durations::TrialDurations;
pub use iti::{
    sample_bounded_exponential, BoundedExponential, IntervalError, IntervalSampler, ItiParams,
};
