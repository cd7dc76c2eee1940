use anyhow::{Context, Result};
use conflict_core::{Condition, ResponseKey, TrialOutcome};
use conflict_experiment::{
    AttentionCheck, Presenter, Session, TaskConfig, TrialRequest, TrialResponse,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, BufWriter, Write};
use std::time::Duration;
use tracing::{debug, info};

use crate::Args;

/// Headless participant standing in for a browser. Conflict trials are
/// slower and less accurate than congruent ones.
pub struct SimulatedParticipant {
    rng: StdRng,
    miss_rate: f64,
    congruent_accuracy: f64,
    incongruent_accuracy: f64,
    base_rt_ms: f64,
    conflict_cost_ms: f64,
    attention_lapse: f64,
    elapsed: Duration,
}

impl SimulatedParticipant {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            miss_rate: 0.03,
            congruent_accuracy: 0.96,
            incongruent_accuracy: 0.86,
            base_rt_ms: 470.0,
            conflict_cost_ms: 65.0,
            attention_lapse: 0.05,
            elapsed: Duration::ZERO,
        }
    }

    /// Simulated wall-clock time spent on screens so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Presenter for SimulatedParticipant {
    fn present_instructions(
        &mut self,
        pages: &[String],
        page_timeout: Duration,
    ) -> Vec<Option<f64>> {
        pages
            .iter()
            .map(|_| {
                let ms: f64 = self.rng.random_range(4_000.0..25_000.0);
                self.elapsed += Duration::from_secs_f64(ms / 1000.0);
                (ms < page_timeout.as_secs_f64() * 1000.0).then_some(ms)
            })
            .collect()
    }

    fn present_message(&mut self, html: &str, timeout: Option<Duration>) {
        debug!(chars = html.len(), ?timeout, "message");
        self.elapsed += timeout.unwrap_or(Duration::from_secs(2));
    }

    fn present_trial(&mut self, request: &TrialRequest<'_>) -> TrialResponse {
        self.elapsed += request.fixation + request.trial_duration + request.post_trial_gap;
        if self.rng.random_bool(self.miss_rate) {
            return TrialResponse::missed();
        }

        let correct = request.stimulus.correct_response;
        let (accuracy, cost) = match request.stimulus.condition {
            Condition::Congruent => (self.congruent_accuracy, 0.0),
            Condition::Incongruent => (self.incongruent_accuracy, self.conflict_cost_ms),
        };
        let key = if self.rng.random_bool(accuracy) {
            correct
        } else {
            let wrong: Vec<ResponseKey> =
                request.choices.iter().copied().filter(|k| *k != correct).collect();
            wrong[self.rng.random_range(0..wrong.len())]
        };
        let jitter: f64 = self.rng.random_range(-120.0..220.0);
        let rt = (self.base_rt_ms + cost + jitter).max(150.0);
        TrialResponse::pressed(key, rt)
    }

    fn present_attention_check(
        &mut self,
        probe: &AttentionCheck,
        timeout: Duration,
    ) -> Option<u32> {
        if self.rng.random_bool(self.attention_lapse) {
            self.elapsed += timeout;
            return None;
        }
        self.elapsed += Duration::from_millis(self.rng.random_range(1_500..4_000));
        Some(probe.key_code)
    }

    fn on_run_complete(&mut self, log: &[TrialOutcome]) {
        info!(
            trials = log.len(),
            simulated_secs = self.elapsed().as_secs(),
            "participant finished"
        );
    }
}

pub struct App {
    session: Session<StdRng>,
    participant: SimulatedParticipant,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => TaskConfig::from_path(path)?,
            None => args.task.default_config(),
        };
        if let Some(group) = args.group {
            config.group_index = group;
        }

        let session = Session::for_task(args.task, config, StdRng::seed_from_u64(args.seed))
            .with_context(|| format!("failed to set up the {} task", args.task))?;
        // Offset so the participant does not mirror the schedule's stream.
        let participant = SimulatedParticipant::new(args.seed.wrapping_add(1));
        info!(task = %args.task, seed = args.seed, "task ready");

        Ok(Self {
            session,
            participant,
        })
    }

    pub fn run(mut self) -> Result<()> {
        self.session.run(&mut self.participant)?;

        let exp_id = self.session.definition().kind.exp_id();
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        for outcome in self.session.event_log() {
            let mut row = serde_json::to_value(outcome)?;
            row["exp_id"] = exp_id.into();
            writeln!(out, "{row}")?;
        }
        for outcome in self.session.attention_log() {
            let mut row = serde_json::to_value(outcome)?;
            row["exp_id"] = exp_id.into();
            writeln!(out, "{row}")?;
        }
        out.flush()?;

        for block in self.session.blocks() {
            info!(
                stage = ?block.stage,
                block = block.block_num,
                accuracy = ?block.stats.accuracy.value(),
                mean_rt_ms = ?block.stats.mean_rt_ms.value(),
                transition = ?block.transition,
                "block summary"
            );
        }
        Ok(())
    }
}
