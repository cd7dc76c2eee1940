pub mod keys;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use keys::{Finger, KeyAssignment, KeyMapping, KeyMappingError, ResponseKey};
pub use phase::{Phase, Stage};
pub use stimulus::{Condition, FlankerLetter, InkColor, Stimulus, StimulusSpec, StimulusType};
pub use trial::{TrialFeedback, TrialId, TrialOutcome};
