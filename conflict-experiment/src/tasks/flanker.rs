use conflict_core::{Finger, FlankerLetter, KeyMapping, KeyMappingError, StimulusSpec, StimulusType};

use super::{TaskDefinition, TaskKind, finger_placement};
use crate::feedback::FeedbackText;

const H_SLOT: usize = 0;
const F_SLOT: usize = 1;

fn letter_for(slot: usize) -> FlankerLetter {
    if slot == H_SLOT {
        FlankerLetter::H
    } else {
        FlankerLetter::F
    }
}

/// The four flanker arrays. The centre letter decides the answer.
pub fn flanker_stimuli(mapping: &KeyMapping<2>) -> Vec<StimulusSpec> {
    use FlankerLetter::*;
    [(F, H), (H, F), (H, H), (F, F)]
        .into_iter()
        .map(|(flanker, center_letter)| {
            let slot = if center_letter == H { H_SLOT } else { F_SLOT };
            StimulusSpec::new(
                StimulusType::Flanker {
                    flanker,
                    center_letter,
                },
                mapping.slots()[slot].key,
            )
        })
        .collect()
}

fn reminder(mapping: &KeyMapping<2>) -> String {
    let mut slots: Vec<(usize, _)> = mapping.slots().iter().copied().enumerate().collect();
    slots.sort_by_key(|(_, a)| a.key.as_char());
    let items: String = slots
        .iter()
        .map(|(slot, a)| {
            format!(
                "<li>{}: {}</li>",
                letter_for(*slot).as_char(),
                a.key.description()
            )
        })
        .collect();
    format!(
        "<ul style=\"text-align:left;\">\
         <li>Indicate the identity of the middle letter.</li>{items}\
         </ul>"
    )
}

fn instructions(mapping: &KeyMapping<2>) -> String {
    let slots = mapping.slots();
    let index_slot = slots
        .iter()
        .position(|a| a.key == Finger::Index.key())
        .unwrap_or(H_SLOT);
    let middle_slot = 1 - index_slot;
    let index_letter = letter_for(index_slot).as_char();
    let middle_letter = letter_for(middle_slot).as_char();
    let example_finger = slots[H_SLOT].finger.name();
    format!(
        "<div class=\"centerbox\">\
         <p class=\"block-text\">{}</p>\
         <p class=\"block-text\">During this task, on each trial you will see a string of F's and \
         H's. For instance, you might see 'FFFFF' or 'HHFHH'.</p>\
         <p class=\"block-text\">Your task is to respond by pressing the key corresponding to the \
         <b>middle</b> letter.</p>\
         <p class=\"block-text\">If the middle letter is an <b>{index_letter}</b>, press your \
         <b>index finger</b>.</p>\
         <p class=\"block-text\">If the middle letter is an <b>{middle_letter}</b>, press your \
         <b>middle finger</b>.</p>\
         <p class=\"block-text\">So, if you see <b>'FFHFF'</b>, you would press your \
         <b>{example_finger}</b>.</p>\
         <p class=\"block-text\">We'll start with a practice round. During practice, you will \
         receive feedback and a reminder of the rules. These will be taken out for the test, so \
         make sure you understand the instructions before moving on.</p>\
         <p class=\"block-text\">Try to respond as quickly and accurately as possible.</p>\
         </div>",
        finger_placement("Place", slots)
    )
}

pub(super) fn definition(group_index: i32) -> Result<TaskDefinition, KeyMappingError> {
    let mapping = KeyMapping::flanker(group_index)?;
    let reminder = reminder(&mapping);
    Ok(TaskDefinition {
        kind: TaskKind::Flanker,
        stimuli: flanker_stimuli(&mapping),
        choices: mapping.choices(),
        instruction_pages: vec![instructions(&mapping)],
        prompt: format!("<div class=\"prompt_box\">{reminder}</div>"),
        feedback_text: FeedbackText {
            response_reminder: reminder,
            finger_placement: finger_placement("Keep", mapping.slots()),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflict_core::{Condition, ResponseKey};

    #[test]
    fn centre_letter_picks_the_key() {
        let mapping = KeyMapping::flanker(2).unwrap();
        for spec in flanker_stimuli(&mapping) {
            let StimulusType::Flanker { center_letter, .. } = spec.stimulus else {
                panic!("flanker pool holds flanker arrays only");
            };
            let expected = match center_letter {
                FlankerLetter::H => ResponseKey::Comma,
                FlankerLetter::F => ResponseKey::Period,
            };
            assert_eq!(spec.correct_response, expected);
        }
    }

    #[test]
    fn pool_is_two_by_two() {
        let specs = flanker_stimuli(&KeyMapping::flanker(7).unwrap());
        let congruent = specs.iter().filter(|s| s.condition == Condition::Congruent).count();
        assert_eq!(congruent, 2);
        assert_eq!(specs.len(), 4);
    }

    #[test]
    fn reminder_follows_mapping() {
        let low = reminder(&KeyMapping::flanker(0).unwrap());
        let high = reminder(&KeyMapping::flanker(5).unwrap());
        assert!(low.contains("<li>H: comma key (,)</li><li>F: period key (.)</li>"));
        assert!(high.contains("<li>F: comma key (,)</li><li>H: period key (.)</li>"));
    }

    #[test]
    fn instructions_name_index_letter() {
        let text = instructions(&KeyMapping::flanker(6).unwrap());
        assert!(
            text.contains("If the middle letter is an <b>F</b>, press your <b>index finger</b>")
        );
        assert!(text.contains("you would press your <b>middle finger</b>"));
    }
}
