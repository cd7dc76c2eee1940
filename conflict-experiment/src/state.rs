use conflict_core::{Phase, Stage, Stimulus, TrialOutcome};
use rand::Rng;
use tracing::{debug, info};

use crate::attention::{AttentionCheck, AttentionCheckScheduler};
use crate::blocks::{BlockBuilder, BlockQueue};
use crate::config::{TaskConfig, Thresholds};
use crate::error::ExperimentError;
use crate::feedback::{Feedback, warnings_for};
use crate::scoring::{BlockStats, Metric, score_block};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeDecision {
    Advance,
    Repeat,
}

/// Practice ends once accuracy reaches the practice threshold or the last
/// allowed practice block has run. `completed` counts finished practice
/// blocks, the current one included.
pub fn decide_practice(
    accuracy: Metric,
    completed: usize,
    thresholds: &Thresholds,
    max_blocks: usize,
) -> PracticeDecision {
    if accuracy.at_least(thresholds.practice_accuracy) || completed >= max_blocks {
        PracticeDecision::Advance
    } else {
        PracticeDecision::Repeat
    }
}

/// What happened at a block boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    RepeatPractice,
    BeginTest,
    NextTestBlock,
    Done,
}

/// Result of closing one block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSummary {
    pub stage: Stage,
    pub block_num: usize,
    pub stats: BlockStats,
    pub transition: Transition,
}

/// Per-task progression state: the stage, both block counters, the queue
/// being presented and the probe scheduled for the next test block.
pub struct ProgressionContext<B, S>
where
    B: BlockBuilder<S>,
    S: Stimulus,
{
    stage: Stage,
    practice_count: usize,
    test_count: usize,
    builder: B,
    queue: BlockQueue<S>,
    attention: AttentionCheckScheduler,
    config: TaskConfig,
    feedback: Feedback,
}

impl<B, S> ProgressionContext<B, S>
where
    B: BlockBuilder<S>,
    S: Stimulus,
{
    pub fn new<R: Rng>(
        config: TaskConfig,
        mut builder: B,
        attention: AttentionCheckScheduler,
        rng: &mut R,
    ) -> Self {
        let queue = builder.practice_block(rng);
        Self {
            stage: Stage::default(),
            practice_count: 0,
            test_count: 0,
            builder,
            queue,
            attention,
            config,
            feedback: Feedback::BeginPractice,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn practice_count(&self) -> usize {
        self.practice_count
    }

    pub fn test_count(&self) -> usize {
        self.test_count
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Number that outcomes of the running block are tagged with.
    pub fn block_num(&self) -> usize {
        match self.stage {
            Stage::Practice => self.practice_count,
            Stage::Test | Stage::Done => self.test_count,
        }
    }

    pub fn queue(&self) -> &BlockQueue<S> {
        &self.queue
    }

    pub fn next_stimulus(&mut self) -> Option<&S> {
        if self.stage.is_done() {
            return None;
        }
        self.queue.next_stimulus()
    }

    /// Feedback screen for the boundary just crossed.
    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    /// Probe to show before the running test block, if any.
    pub fn attention_check(&self) -> Option<&AttentionCheck> {
        if self.stage.is_test() {
            self.attention.current()
        } else {
            None
        }
    }

    /// Closes the running block: bumps its counter, scores it out of `log`,
    /// decides where to go and loads the next queue.
    pub fn complete_block<R: Rng>(
        &mut self,
        log: &[TrialOutcome],
        rng: &mut R,
    ) -> Result<BlockSummary, ExperimentError> {
        let stage = self.stage;
        let (block_num, stats, transition) = match stage {
            Stage::Practice => {
                self.practice_count += 1;
                let block_num = self.practice_count - 1;
                let stats = score_block(log, stage, block_num);
                let transition = self.after_practice(&stats, rng)?;
                (block_num, stats, transition)
            }
            Stage::Test => {
                self.test_count += 1;
                let block_num = self.test_count - 1;
                let stats = score_block(log, stage, block_num);
                let transition = self.after_test(&stats, rng)?;
                (block_num, stats, transition)
            }
            Stage::Done => return Err(ExperimentError::Finished),
        };

        info!(
            stage = stage.label(),
            block = block_num,
            accuracy = ?stats.accuracy,
            missed = ?stats.missed_response_rate,
            mean_rt = ?stats.mean_rt_ms,
            ?transition,
            "block complete"
        );

        Ok(BlockSummary {
            stage,
            block_num,
            stats,
            transition,
        })
    }

    fn after_practice<R: Rng>(
        &mut self,
        stats: &BlockStats,
        rng: &mut R,
    ) -> Result<Transition, ExperimentError> {
        let thresholds = self.config.thresholds;
        match decide_practice(
            stats.accuracy,
            self.practice_count,
            &thresholds,
            self.config.practice_max_blocks,
        ) {
            PracticeDecision::Advance => {
                self.queue = self.builder.test_block(rng)?;
                self.advance_stage();
                self.feedback = Feedback::BeginTest;
                Ok(Transition::BeginTest)
            }
            PracticeDecision::Repeat => {
                self.queue = self.builder.practice_block(rng);
                self.feedback = Feedback::RepeatPractice {
                    warnings: warnings_for(stats, thresholds.practice_accuracy, &thresholds),
                };
                Ok(Transition::RepeatPractice)
            }
        }
    }

    fn after_test<R: Rng>(
        &mut self,
        stats: &BlockStats,
        rng: &mut R,
    ) -> Result<Transition, ExperimentError> {
        self.attention.advance();

        if self.test_count >= self.config.num_test_blocks {
            self.advance_stage();
            self.queue = BlockQueue::new(Vec::new());
            self.feedback = Feedback::Done;
            return Ok(Transition::Done);
        }

        let thresholds = self.config.thresholds;
        self.queue = self.builder.test_block(rng)?;
        self.feedback = Feedback::TestProgress {
            completed: self.test_count,
            total: self.config.num_test_blocks,
            warnings: warnings_for(stats, thresholds.accuracy, &thresholds),
        };
        Ok(Transition::NextTestBlock)
    }

    fn advance_stage(&mut self) {
        if let Some(next) = self.stage.next() {
            debug!(from = self.stage.label(), to = next.label(), "stage change");
            self.stage = next;
        }
    }
}
