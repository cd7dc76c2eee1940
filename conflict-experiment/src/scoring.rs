//! Block-level performance summaries.

use conflict_core::{Stage, TrialId, TrialOutcome};

/// A ratio that may be undefined because its denominator was zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    Indeterminate,
}

impl Metric {
    fn ratio(numerator: f64, denominator: usize) -> Self {
        if denominator == 0 {
            Metric::Indeterminate
        } else {
            Metric::Value(numerator / denominator as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Indeterminate => None,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Metric::Indeterminate)
    }

    /// `false` when indeterminate.
    pub fn at_least(&self, threshold: f64) -> bool {
        self.value().is_some_and(|v| v >= threshold)
    }

    /// `false` when indeterminate.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.value().is_some_and(|v| v > threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStats {
    pub total_trials: usize,
    pub responses: usize,
    pub correct: usize,
    /// Correct over all trials, missed ones included.
    pub accuracy: Metric,
    pub missed_response_rate: Metric,
    /// Mean over trials that got a response, in milliseconds.
    pub mean_rt_ms: Metric,
}

impl BlockStats {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a TrialOutcome>) -> Self {
        let mut total_trials = 0usize;
        let mut responses = 0usize;
        let mut correct = 0usize;
        let mut sum_rt = 0.0;

        for outcome in outcomes {
            total_trials += 1;
            if let Some(rt) = outcome.rt {
                sum_rt += rt;
                responses += 1;
                if outcome.correct_trial {
                    correct += 1;
                }
            }
        }

        Self {
            total_trials,
            responses,
            correct,
            accuracy: Metric::ratio(correct as f64, total_trials),
            missed_response_rate: Metric::ratio((total_trials - responses) as f64, total_trials),
            mean_rt_ms: Metric::ratio(sum_rt, responses),
        }
    }
}

/// Scores the stimulus trials of one stage and block out of the full log.
pub fn score_block(log: &[TrialOutcome], stage: Stage, block_num: usize) -> BlockStats {
    let Some(trial_id) = TrialId::for_stage(stage) else {
        return BlockStats::from_outcomes(std::iter::empty());
    };
    BlockStats::from_outcomes(log.iter().filter(|o| {
        o.trial_id == trial_id && o.exp_stage == stage && o.block_num == block_num
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflict_core::{FlankerLetter, ResponseKey, StimulusSpec, StimulusType};

    fn spec() -> StimulusSpec {
        StimulusSpec::new(
            StimulusType::Flanker {
                flanker: FlankerLetter::H,
                center_letter: FlankerLetter::H,
            },
            ResponseKey::Comma,
        )
    }

    fn outcome(
        stage: Stage,
        block: usize,
        response: Option<ResponseKey>,
        rt: Option<f64>,
    ) -> TrialOutcome {
        let trial_id = TrialId::for_stage(stage).unwrap();
        TrialOutcome::new(trial_id, stage, block, &spec(), response, rt)
    }

    #[test]
    fn missed_trials_count_against_accuracy() {
        let mut log = Vec::new();
        for i in 0..8 {
            let rt = 400.0 + i as f64 * 10.0;
            log.push(outcome(Stage::Test, 0, Some(ResponseKey::Comma), Some(rt)));
        }
        log.push(outcome(Stage::Test, 0, Some(ResponseKey::Period), Some(600.0)));
        log.push(outcome(Stage::Test, 0, None, None));

        let stats = score_block(&log, Stage::Test, 0);
        assert_eq!(stats.total_trials, 10);
        assert_eq!(stats.responses, 9);
        assert_eq!(stats.correct, 8);
        assert_eq!(stats.accuracy, Metric::Value(0.8));
        assert_eq!(stats.missed_response_rate, Metric::Value(0.1));
        let expected_rt =
            (400.0 + 410.0 + 420.0 + 430.0 + 440.0 + 450.0 + 460.0 + 470.0 + 600.0) / 9.0;
        let rt = stats.mean_rt_ms.value().unwrap();
        assert!((rt - expected_rt).abs() < 1e-9);
    }

    #[test]
    fn only_the_requested_block_and_stage_are_scored() {
        let log = vec![
            outcome(Stage::Practice, 0, None, None),
            outcome(Stage::Practice, 1, Some(ResponseKey::Comma), Some(500.0)),
            outcome(Stage::Test, 1, None, None),
        ];
        let stats = score_block(&log, Stage::Practice, 1);
        assert_eq!(stats.total_trials, 1);
        assert_eq!(stats.accuracy, Metric::Value(1.0));
        assert_eq!(stats.missed_response_rate, Metric::Value(0.0));
    }

    #[test]
    fn empty_block_is_indeterminate() {
        let stats = score_block(&[], Stage::Test, 0);
        assert!(stats.accuracy.is_indeterminate());
        assert!(stats.missed_response_rate.is_indeterminate());
        assert!(stats.mean_rt_ms.is_indeterminate());
        assert!(!stats.accuracy.at_least(0.0));
        assert!(!stats.mean_rt_ms.exceeds(0.0));
    }

    #[test]
    fn all_missed_block_has_no_mean_rt() {
        let log = vec![outcome(Stage::Test, 2, None, None), outcome(Stage::Test, 2, None, None)];
        let stats = score_block(&log, Stage::Test, 2);
        assert_eq!(stats.accuracy, Metric::Value(0.0));
        assert_eq!(stats.missed_response_rate, Metric::Value(1.0));
        assert!(stats.mean_rt_ms.is_indeterminate());
    }
}
