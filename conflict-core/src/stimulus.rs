use serde::{Deserialize, Serialize};

use crate::keys::ResponseKey;

/// Defines stimuli as the sequencing engine sees them
pub trait Stimulus: Clone + Send + Sync + std::fmt::Debug {
    fn condition(&self) -> Condition;
    fn correct_response(&self) -> ResponseKey;

    fn is_congruent(&self) -> bool {
        self.condition() == Condition::Congruent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Congruent,
    Incongruent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlankerLetter {
    F,
    H,
}

impl FlankerLetter {
    pub fn as_char(&self) -> char {
        match self {
            FlankerLetter::F => 'F',
            FlankerLetter::H => 'H',
        }
    }
}

/// Stroop word/ink colours. Exported by name, displayed by hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkColor {
    Red,
    Blue,
    Green,
}

impl InkColor {
    pub const ALL: [InkColor; 3] = [InkColor::Red, InkColor::Blue, InkColor::Green];

    pub fn name(&self) -> &'static str {
        match self {
            InkColor::Red => "red",
            InkColor::Blue => "blue",
            InkColor::Green => "green",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            InkColor::Red => "#FF7070",
            InkColor::Blue => "#7070FF",
            InkColor::Green => "#70FF70",
        }
    }
}

/// Display payload of a trial. Field names double as export columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StimulusType {
    Flanker {
        flanker: FlankerLetter,
        center_letter: FlankerLetter,
    },
    Stroop {
        stim_word: InkColor,
        stim_color: InkColor,
    },
}

impl StimulusType {
    pub fn condition(&self) -> Condition {
        let agrees = match self {
            StimulusType::Flanker {
                flanker,
                center_letter,
            } => flanker == center_letter,
            StimulusType::Stroop {
                stim_word,
                stim_color,
            } => stim_word == stim_color,
        };
        if agrees {
            Condition::Congruent
        } else {
            Condition::Incongruent
        }
    }

    /// Five-letter flanker string (`FFHFF`) or the upper-case Stroop word.
    pub fn display_text(&self) -> String {
        match self {
            StimulusType::Flanker {
                flanker,
                center_letter,
            } => {
                let f = flanker.as_char();
                [f, f, center_letter.as_char(), f, f].iter().collect()
            }
            StimulusType::Stroop { stim_word, .. } => stim_word.name().to_uppercase(),
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            StimulusType::Flanker { .. } => format!(
                "<div class=\"centerbox\"><div class=\"flanker-text\">{}</div></div>",
                self.display_text()
            ),
            StimulusType::Stroop { stim_color, .. } => format!(
                "<div class=\"centerbox\">\
                 <div class=\"stroop-stim\" style=\"color:{}\">{}</div>\
                 </div>",
                stim_color.hex(),
                self.display_text()
            ),
        }
    }
}

/// One trial's content: what to show, which condition it belongs to and
/// which key answers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusSpec {
    pub stimulus: StimulusType,
    pub condition: Condition,
    pub correct_response: ResponseKey,
}

impl StimulusSpec {
    pub fn new(stimulus: StimulusType, correct_response: ResponseKey) -> Self {
        let condition = stimulus.condition();
        Self {
            stimulus,
            condition,
            correct_response,
        }
    }
}

impl Stimulus for StimulusSpec {
    fn condition(&self) -> Condition {
        self.condition
    }

    fn correct_response(&self) -> ResponseKey {
        self.correct_response
    }
}
