use serde::{Deserialize, Serialize};

use crate::keys::ResponseKey;
use crate::phase::Stage;
use crate::stimulus::{Condition, StimulusSpec, StimulusType};

/// Kind of a logged stimulus trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialId {
    PracticeTrial,
    TestTrial,
}

impl TrialId {
    pub fn for_stage(stage: Stage) -> Option<Self> {
        match stage {
            Stage::Practice => Some(TrialId::PracticeTrial),
            Stage::Test => Some(TrialId::TestTrial),
            Stage::Done => None,
        }
    }
}

/// Recorded result per stimulus trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub trial_id: TrialId,
    pub exp_stage: Stage,
    pub block_num: usize,
    pub condition: Condition,
    pub correct_response: ResponseKey,
    pub response: Option<ResponseKey>,
    /// Reaction time in milliseconds, absent when no key was pressed.
    pub rt: Option<f64>,
    #[serde(with = "flag")]
    pub correct_trial: bool,
    #[serde(flatten)]
    pub stimulus: StimulusType,
}

impl TrialOutcome {
    pub fn new(
        trial_id: TrialId,
        exp_stage: Stage,
        block_num: usize,
        spec: &StimulusSpec,
        response: Option<ResponseKey>,
        rt: Option<f64>,
    ) -> Self {
        Self {
            trial_id,
            exp_stage,
            block_num,
            condition: spec.condition,
            correct_response: spec.correct_response,
            response,
            rt,
            correct_trial: response == Some(spec.correct_response),
            stimulus: spec.stimulus.clone(),
        }
    }

    pub fn responded(&self) -> bool {
        self.rt.is_some()
    }

    pub fn feedback(&self) -> TrialFeedback {
        if self.response.is_none() {
            TrialFeedback::RespondFaster
        } else if self.correct_trial {
            TrialFeedback::Correct
        } else {
            TrialFeedback::Incorrect
        }
    }
}

/// Message shown after each practice trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialFeedback {
    RespondFaster,
    Correct,
    Incorrect,
}

impl TrialFeedback {
    pub fn message(&self) -> &'static str {
        match self {
            TrialFeedback::RespondFaster => "Respond Faster!",
            TrialFeedback::Correct => "Correct!",
            TrialFeedback::Incorrect => "Incorrect",
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class=center-box><div class=center-text><font size =20>{}</font></div></div>",
            self.message()
        )
    }
}

// Analysis pipelines expect 0/1 rather than JSON booleans.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::FlankerLetter;

    fn spec() -> StimulusSpec {
        StimulusSpec::new(
            StimulusType::Flanker {
                flanker: FlankerLetter::F,
                center_letter: FlankerLetter::H,
            },
            ResponseKey::Comma,
        )
    }

    #[test]
    fn correctness_requires_matching_key() {
        let hit = TrialOutcome::new(
            TrialId::TestTrial,
            Stage::Test,
            0,
            &spec(),
            Some(ResponseKey::Comma),
            Some(512.0),
        );
        let miss = TrialOutcome::new(TrialId::TestTrial, Stage::Test, 0, &spec(), None, None);
        let wrong = TrialOutcome::new(
            TrialId::TestTrial,
            Stage::Test,
            0,
            &spec(),
            Some(ResponseKey::Period),
            Some(430.0),
        );

        assert_eq!(hit.feedback(), TrialFeedback::Correct);
        assert_eq!(miss.feedback(), TrialFeedback::RespondFaster);
        assert!(!miss.responded());
        assert_eq!(wrong.feedback(), TrialFeedback::Incorrect);
    }

    #[test]
    fn record_exports_analysis_columns() {
        let outcome = TrialOutcome::new(
            TrialId::PracticeTrial,
            Stage::Practice,
            2,
            &spec(),
            Some(ResponseKey::Comma),
            Some(480.0),
        );
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["trial_id"], "practice_trial");
        assert_eq!(value["exp_stage"], "practice");
        assert_eq!(value["block_num"], 2);
        assert_eq!(value["condition"], "incongruent");
        assert_eq!(value["correct_response"], ",");
        assert_eq!(value["response"], ",");
        assert_eq!(value["rt"], 480.0);
        assert_eq!(value["correct_trial"], 1);
        assert_eq!(value["flanker"], "F");
        assert_eq!(value["center_letter"], "H");
    }
}
