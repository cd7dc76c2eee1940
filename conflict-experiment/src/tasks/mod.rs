//! Flanker and Stroop task definitions: stimulus pools, key mappings and the
//! wording the shared engine splices into its screens.

mod flanker;
mod stroop;

use std::fmt;
use std::str::FromStr;

use conflict_core::{KeyAssignment, ResponseKey, StimulusSpec};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::blocks::{BalancedBuilder, BlockBuilder, BlockQueue, CyclingBuilder, StimulusPool};
use crate::config::TaskConfig;
use crate::error::{ConfigError, ExperimentError};
use crate::feedback::FeedbackText;

pub use flanker::flanker_stimuli;
pub use stroop::stroop_stimuli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Flanker,
    Stroop,
}

impl TaskKind {
    pub fn exp_id(&self) -> &'static str {
        match self {
            TaskKind::Flanker => "flanker_rdoc",
            TaskKind::Stroop => "stroop_rdoc",
        }
    }

    /// Stock settings for the task. Stroop moves on faster after a probe.
    pub fn default_config(&self) -> TaskConfig {
        let mut config = TaskConfig::default();
        if *self == TaskKind::Stroop {
            config.durations.attention_check_post_ms = 200;
        }
        config
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Flanker => f.write_str("flanker"),
            TaskKind::Stroop => f.write_str("stroop"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flanker" | "flanker_rdoc" => Ok(TaskKind::Flanker),
            "stroop" | "stroop_rdoc" => Ok(TaskKind::Stroop),
            other => Err(format!("unknown task '{other}' (expected flanker or stroop)")),
        }
    }
}

/// Everything task specific the engine needs
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    pub kind: TaskKind,
    pub stimuli: Vec<StimulusSpec>,
    pub choices: Vec<ResponseKey>,
    pub instruction_pages: Vec<String>,
    /// Rule reminder shown under every practice screen.
    pub prompt: String,
    pub feedback_text: FeedbackText,
}

impl TaskDefinition {
    /// Fails fast on a group index outside `0..=14`.
    pub fn new(kind: TaskKind, group_index: i32) -> Result<Self, ConfigError> {
        let definition = match kind {
            TaskKind::Flanker => flanker::definition(group_index)?,
            TaskKind::Stroop => stroop::definition(group_index)?,
        };
        Ok(definition)
    }

    pub fn pool(&self) -> StimulusPool<StimulusSpec> {
        StimulusPool::new(self.stimuli.iter().cloned())
    }

    pub fn block_builder<R: Rng>(
        &self,
        config: &TaskConfig,
        rng: &mut R,
    ) -> Result<TaskBlocks, ConfigError> {
        let pool = self.pool();
        Ok(match self.kind {
            TaskKind::Flanker => TaskBlocks::Cycling(CyclingBuilder::new(&pool, config)?),
            TaskKind::Stroop => TaskBlocks::Balanced(BalancedBuilder::new(&pool, config, rng)?),
        })
    }
}

/// The block policy a task uses
#[derive(Debug, Clone)]
pub enum TaskBlocks {
    Cycling(CyclingBuilder<StimulusSpec>),
    Balanced(BalancedBuilder<StimulusSpec>),
}

impl BlockBuilder<StimulusSpec> for TaskBlocks {
    fn practice_block<R: Rng>(&mut self, rng: &mut R) -> BlockQueue<StimulusSpec> {
        match self {
            TaskBlocks::Cycling(b) => b.practice_block(rng),
            TaskBlocks::Balanced(b) => b.practice_block(rng),
        }
    }

    fn test_block<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<BlockQueue<StimulusSpec>, ExperimentError> {
        match self {
            TaskBlocks::Cycling(b) => b.test_block(rng),
            TaskBlocks::Balanced(b) => b.test_block(rng),
        }
    }
}

/// "index finger on the comma key (,) and your middle finger on ..." in
/// finger order.
fn finger_placement(verb: &str, slots: &[KeyAssignment]) -> String {
    let mut sorted = slots.to_vec();
    sorted.sort_by_key(|a| a.finger as u8);
    let parts: Vec<String> = sorted
        .iter()
        .map(|a| {
            format!(
                "<b>{}</b> on the <b>{}</b>",
                a.finger.name(),
                a.key.description()
            )
        })
        .collect();
    let joined = match parts.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and your {second}"),
        [init @ .., last] => format!("{}, and your {last}", init.join(", your ")),
    };
    format!("{verb} your {joined}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflict_core::{Condition, KeyMapping};

    #[test]
    fn task_names_parse() {
        assert_eq!("flanker".parse::<TaskKind>(), Ok(TaskKind::Flanker));
        assert_eq!("Stroop".parse::<TaskKind>(), Ok(TaskKind::Stroop));
        assert!("nback".parse::<TaskKind>().is_err());
    }

    #[test]
    fn stroop_defaults_shorten_probe_gap() {
        assert_eq!(TaskKind::Flanker.default_config().durations.attention_check_post_ms, 1000);
        assert_eq!(TaskKind::Stroop.default_config().durations.attention_check_post_ms, 200);
    }

    #[test]
    fn pools_have_documented_sizes() {
        let flanker = TaskDefinition::new(TaskKind::Flanker, 0).unwrap();
        let stroop = TaskDefinition::new(TaskKind::Stroop, 0).unwrap();
        assert_eq!(flanker.stimuli.len(), 4);
        assert_eq!(flanker.choices.len(), 2);
        let stroop_pool = stroop.pool();
        assert_eq!(stroop_pool.congruent().len(), 3);
        assert_eq!(stroop_pool.incongruent().len(), 6);
        assert_eq!(stroop.choices.len(), 3);
        assert!(stroop.stimuli.iter().filter(|s| s.condition == Condition::Congruent).count() == 3);
    }

    #[test]
    fn bad_group_index_fails_setup() {
        assert!(matches!(
            TaskDefinition::new(TaskKind::Stroop, 21),
            Err(ConfigError::KeyMapping(_))
        ));
    }

    #[test]
    fn placement_lists_every_finger() {
        let two = finger_placement("Keep", KeyMapping::flanker(9).unwrap().slots());
        assert_eq!(
            two,
            "Keep your <b>index finger</b> on the <b>comma key (,)</b> \
             and your <b>middle finger</b> on the <b>period key (.)</b>"
        );
        let three = finger_placement("Place", KeyMapping::stroop(4).unwrap().slots());
        assert!(
            three.ends_with(", and your <b>ring finger</b> on the <b>forward slash key (/)</b>")
        );
        assert!(three.contains("<b>index finger</b> on the <b>comma key (,)</b>, your <b>middle"));
    }
}
