//! Constrained randomisation of stimulus blocks.
//!
//! Builders never touch the pools they are given; every queue is assembled
//! from clones. Queues are immutable sequences read through a cursor so a
//! block can be inspected or replayed after it has been consumed.

use conflict_core::{Condition, Stimulus};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use crate::config::TaskConfig;
use crate::error::{ConfigError, ExperimentError, QueueKind};

/// Stimuli of one block, consumed front to back.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockQueue<S> {
    items: Vec<S>,
    cursor: usize,
}

impl<S> BlockQueue<S> {
    pub fn new(items: Vec<S>) -> Self {
        Self { items, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    pub fn is_drained(&self) -> bool {
        self.cursor >= self.items.len()
    }

    /// Hands out the next stimulus and moves the cursor past it.
    pub fn next_stimulus(&mut self) -> Option<&S> {
        let item = self.items.get(self.cursor)?;
        self.cursor += 1;
        Some(item)
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn as_slice(&self) -> &[S] {
        &self.items
    }
}

impl<S: Stimulus> BlockQueue<S> {
    pub fn count(&self, condition: Condition) -> usize {
        self.items
            .iter()
            .filter(|s| s.condition() == condition)
            .count()
    }
}

/// A task's stimulus set split by condition
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusPool<S> {
    congruent: Vec<S>,
    incongruent: Vec<S>,
}

impl<S: Stimulus> StimulusPool<S> {
    pub fn new(specs: impl IntoIterator<Item = S>) -> Self {
        let (congruent, incongruent): (Vec<S>, Vec<S>) =
            specs.into_iter().partition(|s| s.is_congruent());
        Self {
            congruent,
            incongruent,
        }
    }

    pub fn congruent(&self) -> &[S] {
        &self.congruent
    }

    pub fn incongruent(&self) -> &[S] {
        &self.incongruent
    }

    pub fn all(&self) -> Vec<S> {
        self.congruent
            .iter()
            .chain(self.incongruent.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.congruent.len() + self.incongruent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Produces practice and test queues for one task instance
pub trait BlockBuilder<S: Stimulus> {
    fn practice_block<R: Rng>(&mut self, rng: &mut R) -> BlockQueue<S>;
    fn test_block<R: Rng>(&mut self, rng: &mut R) -> Result<BlockQueue<S>, ExperimentError>;
}

/// Fisher–Yates shuffle of a copy.
pub fn shuffled<S: Clone, R: Rng>(items: &[S], rng: &mut R) -> Vec<S> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// `cycles` copies of `items`, each copy shuffled on its own.
pub fn repeat_shuffled<S: Clone, R: Rng>(items: &[S], cycles: usize, rng: &mut R) -> Vec<S> {
    let mut out = Vec::with_capacity(items.len() * cycles);
    for _ in 0..cycles {
        out.extend(shuffled(items, rng));
    }
    out
}

/// Up to `n` distinct positions of `items`, drawn without replacement.
pub fn sample_without_replacement<S: Clone, R: Rng>(items: &[S], n: usize, rng: &mut R) -> Vec<S> {
    items.choose_multiple(rng, n).cloned().collect()
}

/// Cycles of `pool` needed to fill `size`. Empty sizes are rejected so no
/// block or chunk can come out empty.
fn check_divides(what: &'static str, size: usize, pool: usize) -> Result<usize, ConfigError> {
    if size == 0 {
        return Err(ConfigError::OutOfRange {
            field: what,
            expected: "at least 1",
            value: size.to_string(),
        });
    }
    if pool == 0 || size % pool != 0 {
        return Err(ConfigError::Indivisible { what, size, pool });
    }
    Ok(size / pool)
}

/// Repeats the whole pool in independently shuffled cycles. Every block is
/// balanced because the pool itself is.
#[derive(Debug, Clone)]
pub struct CyclingBuilder<S> {
    pool: Vec<S>,
    practice_cycles: usize,
    test_cycles: usize,
    test_blocks: usize,
    issued_test_blocks: usize,
}

impl<S: Stimulus> CyclingBuilder<S> {
    pub fn new(pool: &StimulusPool<S>, config: &TaskConfig) -> Result<Self, ConfigError> {
        if pool.congruent().len() != pool.incongruent().len() {
            return Err(ConfigError::UnbalancedPool {
                congruent: pool.congruent().len(),
                incongruent: pool.incongruent().len(),
            });
        }
        let practice_cycles = check_divides("practice_len", config.practice_len, pool.len())?;
        let test_cycles =
            check_divides("num_trials_per_block", config.num_trials_per_block, pool.len())?;
        if config.num_test_blocks == 0 {
            return Err(ConfigError::OutOfRange {
                field: "num_test_blocks",
                expected: "at least 1",
                value: config.num_test_blocks.to_string(),
            });
        }
        Ok(Self {
            pool: pool.all(),
            practice_cycles,
            test_cycles,
            test_blocks: config.num_test_blocks,
            issued_test_blocks: 0,
        })
    }
}

impl<S: Stimulus> BlockBuilder<S> for CyclingBuilder<S> {
    fn practice_block<R: Rng>(&mut self, rng: &mut R) -> BlockQueue<S> {
        BlockQueue::new(repeat_shuffled(&self.pool, self.practice_cycles, rng))
    }

    fn test_block<R: Rng>(&mut self, rng: &mut R) -> Result<BlockQueue<S>, ExperimentError> {
        if self.issued_test_blocks >= self.test_blocks {
            return Err(ExperimentError::Exhausted(QueueKind::TestBlocks));
        }
        self.issued_test_blocks += 1;
        debug!(block = self.issued_test_blocks, "cycling test block built");
        Ok(BlockQueue::new(repeat_shuffled(&self.pool, self.test_cycles, rng)))
    }
}

/// Draws practice halves without replacement from each condition and lays
/// out the whole test session up front: one condition-balanced pool cut
/// into per-block halves, each block shuffled.
#[derive(Debug, Clone)]
pub struct BalancedBuilder<S> {
    pool: StimulusPool<S>,
    practice_per_condition: usize,
    trials_per_block: usize,
    schedule: Vec<S>,
    next_block: usize,
}

impl<S: Stimulus> BalancedBuilder<S> {
    pub fn new<R: Rng>(
        pool: &StimulusPool<S>,
        config: &TaskConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let practice_per_condition = check_divides("practice_len", config.practice_len, 2)?;
        for side in [pool.congruent().len(), pool.incongruent().len()] {
            if side < practice_per_condition {
                return Err(ConfigError::OutOfRange {
                    field: "practice_len",
                    expected: "at most twice the smaller condition pool",
                    value: config.practice_len.to_string(),
                });
            }
        }

        let half_block = check_divides("num_trials_per_block", config.num_trials_per_block, 2)?;
        let per_condition = half_block * config.num_test_blocks;
        let congruent_reps = check_divides(
            "congruent test trials",
            per_condition,
            pool.congruent().len(),
        )?;
        let incongruent_reps = check_divides(
            "incongruent test trials",
            per_condition,
            pool.incongruent().len(),
        )?;

        let congruent = shuffled(&repeated(pool.congruent(), congruent_reps), rng);
        let incongruent = shuffled(&repeated(pool.incongruent(), incongruent_reps), rng);

        let mut schedule = Vec::with_capacity(per_condition * 2);
        for (c, i) in congruent
            .chunks(half_block)
            .zip(incongruent.chunks(half_block))
        {
            let mut block: Vec<S> = c.iter().chain(i.iter()).cloned().collect();
            block.shuffle(rng);
            schedule.extend(block);
        }

        Ok(Self {
            pool: pool.clone(),
            practice_per_condition,
            trials_per_block: config.num_trials_per_block,
            schedule,
            next_block: 0,
        })
    }

    /// Every test trial of the session in presentation order.
    pub fn schedule(&self) -> &[S] {
        &self.schedule
    }

    pub fn blocks_remaining(&self) -> usize {
        self.schedule.len() / self.trials_per_block - self.next_block
    }
}

fn repeated<S: Clone>(items: &[S], times: usize) -> Vec<S> {
    let mut out = Vec::with_capacity(items.len() * times);
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    out
}

impl<S: Stimulus> BlockBuilder<S> for BalancedBuilder<S> {
    fn practice_block<R: Rng>(&mut self, rng: &mut R) -> BlockQueue<S> {
        let mut items =
            sample_without_replacement(self.pool.congruent(), self.practice_per_condition, rng);
        items.extend(sample_without_replacement(
            self.pool.incongruent(),
            self.practice_per_condition,
            rng,
        ));
        items.shuffle(rng);
        BlockQueue::new(items)
    }

    fn test_block<R: Rng>(&mut self, _rng: &mut R) -> Result<BlockQueue<S>, ExperimentError> {
        let start = self.next_block * self.trials_per_block;
        let end = start + self.trials_per_block;
        let Some(block) = self.schedule.get(start..end) else {
            return Err(ExperimentError::Exhausted(QueueKind::TestBlocks));
        };
        self.next_block += 1;
        debug!(block = self.next_block, "balanced test block issued");
        Ok(BlockQueue::new(block.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{flanker_stimuli, stroop_stimuli};
    use conflict_core::{KeyMapping, StimulusSpec};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn flanker_pool() -> StimulusPool<StimulusSpec> {
        StimulusPool::new(flanker_stimuli(&KeyMapping::flanker(1).unwrap()))
    }

    fn stroop_pool() -> StimulusPool<StimulusSpec> {
        StimulusPool::new(stroop_stimuli(&KeyMapping::stroop(1).unwrap()))
    }

    fn multiplicity(items: &[StimulusSpec], spec: &StimulusSpec) -> usize {
        items.iter().filter(|s| *s == spec).count()
    }

    #[test]
    fn queue_cursor_drains_and_rewinds() {
        let mut queue = BlockQueue::new(vec![1, 2, 3]);
        assert_eq!(queue.next_stimulus(), Some(&1));
        assert_eq!(queue.remaining(), 2);
        queue.next_stimulus();
        queue.next_stimulus();
        assert!(queue.is_drained());
        assert_eq!(queue.next_stimulus(), None);
        queue.rewind();
        assert_eq!(queue.next_stimulus(), Some(&1));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn cycling_blocks_contain_whole_cycles() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = flanker_pool();
        let mut builder = CyclingBuilder::new(&pool, &TaskConfig::default()).unwrap();

        let practice = builder.practice_block(&mut rng);
        assert_eq!(practice.len(), 4);
        for spec in pool.all() {
            assert_eq!(multiplicity(practice.as_slice(), &spec), 1);
        }

        let test = builder.test_block(&mut rng).unwrap();
        assert_eq!(test.len(), 40);
        assert_eq!(test.count(Condition::Congruent), 20);
        for cycle in test.as_slice().chunks(4) {
            for spec in pool.all() {
                assert_eq!(multiplicity(cycle, &spec), 1);
            }
        }
    }

    #[test]
    fn cycling_builder_stops_after_last_test_block() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut builder = CyclingBuilder::new(&flanker_pool(), &TaskConfig::default()).unwrap();
        for _ in 0..3 {
            builder.test_block(&mut rng).unwrap();
        }
        assert!(matches!(
            builder.test_block(&mut rng),
            Err(ExperimentError::Exhausted(QueueKind::TestBlocks))
        ));
    }

    #[test]
    fn cycling_builder_rejects_partial_cycles() {
        let config = TaskConfig {
            num_trials_per_block: 42,
            ..TaskConfig::default()
        };
        assert!(matches!(
            CyclingBuilder::new(&flanker_pool(), &config),
            Err(ConfigError::Indivisible { size: 42, pool: 4, .. })
        ));
    }

    #[test]
    fn balanced_test_blocks_split_evenly() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = stroop_pool();
        let mut builder = BalancedBuilder::new(&pool, &TaskConfig::default(), &mut rng).unwrap();
        assert_eq!(builder.blocks_remaining(), 3);

        let mut seen = Vec::new();
        for _ in 0..3 {
            let block = builder.test_block(&mut rng).unwrap();
            assert_eq!(block.len(), 40);
            assert_eq!(block.count(Condition::Congruent), 20);
            assert_eq!(block.count(Condition::Incongruent), 20);
            seen.extend_from_slice(block.as_slice());
        }
        assert_eq!(builder.blocks_remaining(), 0);
        assert!(builder.test_block(&mut rng).is_err());
        assert_eq!(seen.as_slice(), builder.schedule());

        assert_eq!(seen.len(), 120);
        for spec in pool.congruent() {
            assert_eq!(multiplicity(&seen, spec), 20);
        }
        for spec in pool.incongruent() {
            assert_eq!(multiplicity(&seen, spec), 10);
        }
    }

    #[test]
    fn balanced_practice_draws_distinct_items_per_condition() {
        let mut rng = StdRng::seed_from_u64(4);
        let pool = stroop_pool();
        let mut builder = BalancedBuilder::new(&pool, &TaskConfig::default(), &mut rng).unwrap();
        for _ in 0..50 {
            let block = builder.practice_block(&mut rng);
            assert_eq!(block.len(), 4);
            assert_eq!(block.count(Condition::Congruent), 2);
            assert_eq!(block.count(Condition::Incongruent), 2);
            for spec in block.as_slice() {
                assert_eq!(multiplicity(block.as_slice(), spec), 1);
            }
        }
    }

    #[test]
    fn empty_sizes_are_config_errors() {
        let mut rng = StdRng::seed_from_u64(12);
        let empty_blocks = TaskConfig {
            num_trials_per_block: 0,
            ..TaskConfig::default()
        };
        assert!(matches!(
            BalancedBuilder::new(&stroop_pool(), &empty_blocks, &mut rng),
            Err(ConfigError::OutOfRange { field: "num_trials_per_block", .. })
        ));
        assert!(matches!(
            CyclingBuilder::new(&flanker_pool(), &empty_blocks),
            Err(ConfigError::OutOfRange { field: "num_trials_per_block", .. })
        ));

        let no_tests = TaskConfig {
            num_test_blocks: 0,
            ..TaskConfig::default()
        };
        assert!(matches!(
            BalancedBuilder::new(&stroop_pool(), &no_tests, &mut rng),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            CyclingBuilder::new(&flanker_pool(), &no_tests),
            Err(ConfigError::OutOfRange { field: "num_test_blocks", .. })
        ));

        let no_practice = TaskConfig {
            practice_len: 0,
            ..TaskConfig::default()
        };
        assert!(matches!(
            CyclingBuilder::new(&flanker_pool(), &no_practice),
            Err(ConfigError::OutOfRange { field: "practice_len", .. })
        ));
    }

    #[test]
    fn balanced_builder_rejects_uneven_pools() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = TaskConfig {
            num_trials_per_block: 10,
            num_test_blocks: 1,
            ..TaskConfig::default()
        };
        assert!(matches!(
            BalancedBuilder::new(&stroop_pool(), &config, &mut rng),
            Err(ConfigError::Indivisible { .. })
        ));

        let config = TaskConfig {
            practice_len: 8,
            ..TaskConfig::default()
        };
        assert!(matches!(
            BalancedBuilder::new(&stroop_pool(), &config, &mut rng),
            Err(ConfigError::OutOfRange { field: "practice_len", .. })
        ));
    }

    #[test]
    fn building_leaves_the_pool_untouched() {
        let mut rng = StdRng::seed_from_u64(6);
        let pool = stroop_pool();
        let before = pool.clone();
        let mut builder = BalancedBuilder::new(&pool, &TaskConfig::default(), &mut rng).unwrap();
        builder.practice_block(&mut rng);
        builder.practice_block(&mut rng);
        builder.test_block(&mut rng).unwrap();
        assert_eq!(pool, before);

        let items = vec![1, 2, 3, 4, 5];
        let copy = shuffled(&items, &mut rng);
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        let mut sorted = copy.clone();
        sorted.sort();
        assert_eq!(sorted, items);
    }

    #[test]
    fn sampling_without_replacement_caps_at_pool_size() {
        let mut rng = StdRng::seed_from_u64(8);
        let drawn = sample_without_replacement(&[1, 2, 3], 5, &mut rng);
        assert_eq!(drawn.len(), 3);
    }
}
