pub mod attention;
pub mod blocks;
pub mod config;
pub mod error;
pub mod feedback;
pub mod instructions;
pub mod scoring;
pub mod session;
pub mod state;
pub mod tasks;

pub use attention::{
    AttentionCheck, AttentionCheckOutcome, AttentionCheckQueue, AttentionCheckScheduler,
    default_probes,
};
pub use blocks::{BalancedBuilder, BlockBuilder, BlockQueue, CyclingBuilder, StimulusPool};
pub use config::{TaskConfig, Thresholds};
pub use error::{ConfigError, ExperimentError, QueueKind};
pub use feedback::{Feedback, FeedbackText, Warning, warnings_for};
pub use instructions::{InstructionDecision, InstructionGate};
pub use scoring::{BlockStats, Metric, score_block};
pub use session::{ItiRecord, Presenter, Session, TrialRequest, TrialResponse};
pub use state::{BlockSummary, PracticeDecision, ProgressionContext, Transition, decide_practice};
pub use tasks::{TaskBlocks, TaskDefinition, TaskKind};
