//! Drives one task from the welcome screen to the end message through a
//! [`Presenter`], keeping the event log the progression decisions are scored
//! from.

use std::time::Duration;

use conflict_core::{Phase, ResponseKey, Stage, StimulusSpec, TrialId, TrialOutcome};
use conflict_timing::{BoundedExponential, IntervalSampler, ItiParams};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::attention::{
    AttentionCheck, AttentionCheckOutcome, AttentionCheckScheduler, default_probes,
};
use crate::config::TaskConfig;
use crate::error::{ConfigError, ExperimentError};
use crate::feedback::Feedback;
use crate::instructions::{END, InstructionDecision, InstructionGate, WELCOME};
use crate::state::{BlockSummary, ProgressionContext};
use crate::tasks::{TaskBlocks, TaskDefinition, TaskKind};

const FIXATION: &str = "<div class=\"centerbox\"><div class=\"fixation\">+</div></div>";

/// Everything a presenter needs to run one stimulus trial
#[derive(Debug, Clone)]
pub struct TrialRequest<'a> {
    pub stage: Stage,
    pub block_num: usize,
    /// Position within the block, from zero.
    pub trial_index: usize,
    pub stimulus: &'a StimulusSpec,
    pub html: String,
    /// Rule reminder, practice only.
    pub prompt: Option<&'a str>,
    pub choices: &'a [ResponseKey],
    pub fixation_html: &'static str,
    pub fixation: Duration,
    pub stimulus_duration: Duration,
    /// Response window from stimulus onset.
    pub trial_duration: Duration,
    /// Blank gap after the trial, freshly sampled.
    pub post_trial_gap: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrialResponse {
    pub key: Option<ResponseKey>,
    pub rt_ms: Option<f64>,
}

impl TrialResponse {
    pub fn pressed(key: ResponseKey, rt_ms: f64) -> Self {
        Self {
            key: Some(key),
            rt_ms: Some(rt_ms),
        }
    }

    pub fn missed() -> Self {
        Self::default()
    }

    /// Keys outside `choices` and presses after the window count as no
    /// response.
    fn accepted(self, choices: &[ResponseKey], window: Duration) -> Self {
        match (self.key, self.rt_ms) {
            (Some(key), Some(rt))
                if choices.contains(&key) && rt >= 0.0 && rt <= window.as_secs_f64() * 1000.0 =>
            {
                self
            }
            (None, None) => self,
            _ => {
                debug!(?self, "response outside the trial window dropped");
                Self::missed()
            }
        }
    }
}

/// The display side of a task. Implementations show things and report what
/// the participant did; all sequencing stays in [`Session`].
pub trait Presenter {
    /// Shows every page and returns each page's viewing time in ms, `None`
    /// for a page that timed out.
    fn present_instructions(
        &mut self,
        pages: &[String],
        page_timeout: Duration,
    ) -> Vec<Option<f64>>;

    /// `None` waits for the participant to continue.
    fn present_message(&mut self, html: &str, timeout: Option<Duration>);

    fn present_trial(&mut self, request: &TrialRequest<'_>) -> TrialResponse;

    /// Returns the pressed key code, if any.
    fn present_attention_check(
        &mut self,
        probe: &AttentionCheck,
        timeout: Duration,
    ) -> Option<u32>;

    fn on_run_complete(&mut self, _log: &[TrialOutcome]) {}
}

/// One sampled inter-trial interval with the parameters it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItiRecord {
    pub exp_stage: Stage,
    pub block_num: usize,
    pub trial_index: usize,
    pub post_trial_gap_ms: f64,
    #[serde(rename = "ITIParams")]
    pub params: ItiParams,
}

pub struct Session<R: Rng> {
    definition: TaskDefinition,
    progression: ProgressionContext<TaskBlocks, StimulusSpec>,
    sampler: BoundedExponential,
    gate: InstructionGate,
    rng: R,
    log: Vec<TrialOutcome>,
    attention_log: Vec<AttentionCheckOutcome>,
    itis: Vec<ItiRecord>,
    blocks: Vec<BlockSummary>,
}

impl<R: Rng> Session<R> {
    /// Validates `config` and prepares every queue; nothing is presented yet.
    pub fn new(
        definition: TaskDefinition,
        config: TaskConfig,
        mut rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let sampler = BoundedExponential::new(config.iti)?;
        let builder = definition.block_builder(&config, &mut rng)?;
        let attention =
            AttentionCheckScheduler::new(config.run_attention_checks, &default_probes(), &mut rng);
        let gate = InstructionGate::new(
            config.instruct_time_threshold_secs,
            config.durations.instruction_page(),
        );
        let progression = ProgressionContext::new(config, builder, attention, &mut rng);
        Ok(Self {
            definition,
            progression,
            sampler,
            gate,
            rng,
            log: Vec::new(),
            attention_log: Vec::new(),
            itis: Vec::new(),
            blocks: Vec::new(),
        })
    }

    pub fn for_task(kind: TaskKind, config: TaskConfig, rng: R) -> Result<Self, ConfigError> {
        let definition = TaskDefinition::new(kind, config.group_index)?;
        Self::new(definition, config, rng)
    }

    pub fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    pub fn stage(&self) -> Stage {
        self.progression.stage()
    }

    /// Every stimulus trial so far, in presentation order.
    pub fn event_log(&self) -> &[TrialOutcome] {
        &self.log
    }

    pub fn attention_log(&self) -> &[AttentionCheckOutcome] {
        &self.attention_log
    }

    pub fn itis(&self) -> &[ItiRecord] {
        &self.itis
    }

    pub fn blocks(&self) -> &[BlockSummary] {
        &self.blocks
    }

    pub fn run<P: Presenter>(&mut self, presenter: &mut P) -> Result<(), ExperimentError> {
        if self.stage().is_done() {
            return Err(ExperimentError::Finished);
        }
        info!(task = %self.definition.kind, "session started");

        presenter.present_message(WELCOME, None);
        self.run_instructions(presenter);

        while !self.stage().is_done() {
            self.present_feedback(presenter);
            if self.stage().is_test() {
                self.run_attention_check(presenter);
            }
            self.run_block(presenter);
            let summary = self.progression.complete_block(&self.log, &mut self.rng)?;
            self.blocks.push(summary);
        }

        let durations = self.progression.config().durations;
        presenter.present_message(END, Some(durations.end()));
        info!(
            trials = self.log.len(),
            attention_checks = self.attention_log.len(),
            "session finished"
        );
        presenter.on_run_complete(&self.log);
        Ok(())
    }

    fn run_instructions<P: Presenter>(&mut self, presenter: &mut P) {
        let durations = self.progression.config().durations;
        loop {
            let times = presenter.present_instructions(
                &self.definition.instruction_pages,
                durations.instruction_page(),
            );
            let decision = self.gate.evaluate(&times);
            debug!(?times, ?decision, "instructions read");
            presenter.present_message(decision.message(), Some(durations.instruction_feedback()));
            if decision == InstructionDecision::Continue {
                break;
            }
        }
    }

    fn present_feedback<P: Presenter>(&self, presenter: &mut P) {
        let feedback = self.progression.feedback();
        let timeout = match feedback {
            Feedback::BeginPractice | Feedback::BeginTest => None,
            _ => Some(self.progression.config().durations.block_feedback()),
        };
        presenter.present_message(&feedback.render(&self.definition.feedback_text), timeout);
    }

    fn run_attention_check<P: Presenter>(&mut self, presenter: &mut P) {
        let durations = self.progression.config().durations;
        let block_num = self.progression.block_num();
        let Some(probe) = self.progression.attention_check() else {
            return;
        };
        let pressed = presenter.present_attention_check(probe, durations.attention_check());
        let outcome = AttentionCheckOutcome::new(probe, block_num, pressed);
        debug!(block = block_num, correct = outcome.correct_trial, "attention check answered");
        self.attention_log.push(outcome);
        presenter.present_message("", Some(durations.attention_check_post()));
    }

    fn run_block<P: Presenter>(&mut self, presenter: &mut P) {
        let stage = self.progression.stage();
        let block_num = self.progression.block_num();
        let Some(trial_id) = TrialId::for_stage(stage) else {
            return;
        };
        let durations = self.progression.config().durations;
        let practice = stage.is_practice();

        let mut trial_index = 0;
        while let Some(spec) = self.progression.next_stimulus().cloned() {
            let gap = self.sampler.next_interval(&mut self.rng);
            let request = TrialRequest {
                stage,
                block_num,
                trial_index,
                stimulus: &spec,
                html: spec.stimulus.to_html(),
                prompt: practice.then_some(self.definition.prompt.as_str()),
                choices: &self.definition.choices,
                fixation_html: FIXATION,
                fixation: durations.fixation(),
                stimulus_duration: durations.stimulus(),
                trial_duration: durations.trial(),
                post_trial_gap: gap,
            };
            let response = presenter
                .present_trial(&request)
                .accepted(&self.definition.choices, durations.trial());

            let outcome =
                TrialOutcome::new(trial_id, stage, block_num, &spec, response.key, response.rt_ms);
            if practice {
                presenter.present_message(
                    &outcome.feedback().to_html(),
                    Some(durations.practice_feedback()),
                );
            }
            self.log.push(outcome);
            self.itis.push(ItiRecord {
                exp_stage: stage,
                block_num,
                trial_index,
                post_trial_gap_ms: gap.as_secs_f64() * 1000.0,
                params: self.sampler.params(),
            });
            trial_index += 1;
        }
    }
}
