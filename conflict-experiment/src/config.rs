use std::path::Path;

use conflict_timing::{ItiParams, TrialDurations};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Performance gates applied after every block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Accuracy needed to leave practice early.
    pub practice_accuracy: f64,
    /// Accuracy below which test feedback warns. Never gates progression.
    pub accuracy: f64,
    pub rt_ms: f64,
    pub missed_response: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            practice_accuracy: 0.75,
            accuracy: 0.8,
            rt_ms: 750.0,
            missed_response: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub thresholds: Thresholds,
    pub practice_len: usize,
    pub practice_max_blocks: usize,
    pub num_trials_per_block: usize,
    pub num_test_blocks: usize,
    pub run_attention_checks: bool,
    /// Instructions read in this many seconds or less are shown again.
    pub instruct_time_threshold_secs: f64,
    /// Counterbalancing group selecting the response-key mapping.
    pub group_index: i32,
    pub iti: ItiParams,
    pub durations: TrialDurations,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            practice_len: 4,
            practice_max_blocks: 3,
            num_trials_per_block: 40,
            num_test_blocks: 3,
            run_attention_checks: true,
            instruct_time_threshold_secs: 5.0,
            group_index: 1,
            iti: ItiParams::default(),
            durations: TrialDurations::default(),
        }
    }
}

impl TaskConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks task-independent ranges. Pool divisibility is checked by the
    /// block builders, which know their pool sizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("practice_len", self.practice_len)?;
        positive("practice_max_blocks", self.practice_max_blocks)?;
        positive("num_trials_per_block", self.num_trials_per_block)?;
        positive("num_test_blocks", self.num_test_blocks)?;

        let t = &self.thresholds;
        unit_interval("thresholds.practice_accuracy", t.practice_accuracy)?;
        unit_interval("thresholds.accuracy", t.accuracy)?;
        unit_interval("thresholds.missed_response", t.missed_response)?;
        if !(t.rt_ms.is_finite() && t.rt_ms > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "thresholds.rt_ms",
                expected: "a positive number of milliseconds",
                value: t.rt_ms.to_string(),
            });
        }
        let instruct_secs = self.instruct_time_threshold_secs;
        if !(instruct_secs.is_finite() && instruct_secs >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "instruct_time_threshold_secs",
                expected: "a non-negative number of seconds",
                value: self.instruct_time_threshold_secs.to_string(),
            });
        }
        self.iti.validate()?;
        Ok(())
    }
}

fn positive(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::OutOfRange {
            field,
            expected: "at least 1",
            value: value.to_string(),
        });
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            expected: "within [0, 1]",
            value: value.to_string(),
        });
    }
    Ok(())
}
