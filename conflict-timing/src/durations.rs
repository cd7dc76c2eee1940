use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed display timings of a task, in milliseconds. The ITI is sampled
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialDurations {
    pub fixation_ms: u64,
    /// How long the stimulus stays on screen.
    pub stimulus_ms: u64,
    /// Full response window, measured from stimulus onset.
    pub trial_ms: u64,
    pub practice_feedback_ms: u64,
    pub block_feedback_ms: u64,
    pub attention_check_ms: u64,
    pub attention_check_post_ms: u64,
    pub instruction_page_ms: u64,
    pub instruction_feedback_ms: u64,
    pub end_ms: u64,
}

impl Default for TrialDurations {
    fn default() -> Self {
        Self {
            fixation_ms: 500,
            stimulus_ms: 1000,
            trial_ms: 1500,
            practice_feedback_ms: 500,
            block_feedback_ms: 30_000,
            attention_check_ms: 15_000,
            attention_check_post_ms: 1000,
            instruction_page_ms: 60_000,
            instruction_feedback_ms: 30_000,
            end_ms: 15_000,
        }
    }
}

impl TrialDurations {
    pub fn fixation(&self) -> Duration {
        Duration::from_millis(self.fixation_ms)
    }

    pub fn stimulus(&self) -> Duration {
        Duration::from_millis(self.stimulus_ms)
    }

    pub fn trial(&self) -> Duration {
        Duration::from_millis(self.trial_ms)
    }

    pub fn practice_feedback(&self) -> Duration {
        Duration::from_millis(self.practice_feedback_ms)
    }

    pub fn block_feedback(&self) -> Duration {
        Duration::from_millis(self.block_feedback_ms)
    }

    pub fn attention_check(&self) -> Duration {
        Duration::from_millis(self.attention_check_ms)
    }

    pub fn attention_check_post(&self) -> Duration {
        Duration::from_millis(self.attention_check_post_ms)
    }

    pub fn instruction_page(&self) -> Duration {
        Duration::from_millis(self.instruction_page_ms)
    }

    pub fn instruction_feedback(&self) -> Duration {
        Duration::from_millis(self.instruction_feedback_ms)
    }

    pub fn end(&self) -> Duration {
        Duration::from_millis(self.end_ms)
    }
}
