//! Attention-check probes interleaved into the test blocks.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A non-task question with a single correct key (JavaScript key code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionCheck {
    pub question: String,
    pub key_code: u32,
}

impl AttentionCheck {
    pub fn new(question: impl Into<String>, key_code: u32) -> Self {
        Self {
            question: question.into(),
            key_code,
        }
    }

    pub fn is_correct(&self, pressed: Option<u32>) -> bool {
        pressed == Some(self.key_code)
    }

    pub fn to_html(&self) -> String {
        format!(
            "<p class='block-text'>{}</p> <div class=\"block-text\">\
             This screen will advance automatically in 15 seconds. Do not press shift.</div>",
            self.question
        )
    }
}

/// Recorded result of one probe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttentionCheckOutcome {
    pub trial_id: &'static str,
    pub exp_stage: &'static str,
    pub block_num: usize,
    pub question: String,
    pub correct_response: u32,
    pub response: Option<u32>,
    pub correct_trial: u8,
}

impl AttentionCheckOutcome {
    pub fn new(check: &AttentionCheck, block_num: usize, response: Option<u32>) -> Self {
        Self {
            trial_id: "test_attention_check",
            exp_stage: "test",
            block_num,
            question: check.question.clone(),
            correct_response: check.key_code,
            response,
            correct_trial: u8::from(check.is_correct(response)),
        }
    }
}

/// Key-press and alphabet-position probes.
pub fn default_probes() -> Vec<AttentionCheck> {
    let keys = [
        ('q', 81),
        ('p', 80),
        ('r', 82),
        ('s', 83),
        ('t', 84),
        ('j', 74),
        ('k', 75),
        ('e', 69),
        ('m', 77),
        ('i', 73),
        ('u', 85),
    ];
    let alphabet = [
        ("first", 65),
        ("second", 66),
        ("third", 67),
        ("third to last", 88),
        ("second to last", 89),
        ("last", 90),
    ];

    keys.iter()
        .map(|(key, code)| AttentionCheck::new(format!("Press the {key} key"), *code))
        .chain(alphabet.iter().map(|(position, code)| {
            AttentionCheck::new(
                format!("Press the key for the {position} letter of the English alphabet."),
                *code,
            )
        }))
        .collect()
}

/// Probes shuffled once, then handed out without replacement.
#[derive(Debug, Clone)]
pub struct AttentionCheckQueue {
    probes: Vec<AttentionCheck>,
    cursor: usize,
}

impl AttentionCheckQueue {
    pub fn new<R: Rng>(pool: &[AttentionCheck], rng: &mut R) -> Self {
        let mut probes = pool.to_vec();
        probes.shuffle(rng);
        Self { probes, cursor: 0 }
    }

    pub fn next_probe(&mut self) -> Option<&AttentionCheck> {
        let probe = self.probes.get(self.cursor)?;
        self.cursor += 1;
        Some(probe)
    }

    pub fn remaining(&self) -> usize {
        self.probes.len().saturating_sub(self.cursor)
    }
}

/// Holds the probe for the upcoming test block. Disabled schedulers never
/// hold one.
#[derive(Debug, Clone)]
pub struct AttentionCheckScheduler {
    queue: Option<AttentionCheckQueue>,
    current: Option<AttentionCheck>,
}

impl AttentionCheckScheduler {
    /// Shuffles the pool and loads the probe for the first test block.
    pub fn new<R: Rng>(enabled: bool, pool: &[AttentionCheck], rng: &mut R) -> Self {
        if !enabled {
            return Self::disabled();
        }
        let mut queue = AttentionCheckQueue::new(pool, rng);
        let current = queue.next_probe().cloned();
        if current.is_none() {
            warn!("attention check pool is empty");
        }
        Self {
            queue: Some(queue),
            current,
        }
    }

    pub fn disabled() -> Self {
        Self {
            queue: None,
            current: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.queue.is_some()
    }

    pub fn current(&self) -> Option<&AttentionCheck> {
        self.current.as_ref()
    }

    /// Moves on to the next probe after a test block. Once the queue runs
    /// dry no probe is shown.
    pub fn advance(&mut self) -> Option<&AttentionCheck> {
        let queue = self.queue.as_mut()?;
        self.current = queue.next_probe().cloned();
        match &self.current {
            Some(probe) => debug!(key_code = probe.key_code, "attention check scheduled"),
            None => warn!("attention check queue exhausted"),
        }
        self.current.as_ref()
    }
}
