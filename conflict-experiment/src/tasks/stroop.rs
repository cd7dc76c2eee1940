use conflict_core::{
    InkColor, KeyMapping, KeyMappingError, ResponseKey, StimulusSpec, StimulusType,
};

use super::{TaskDefinition, TaskKind, finger_placement};
use crate::feedback::FeedbackText;

fn slot(color: InkColor) -> usize {
    match color {
        InkColor::Red => 0,
        InkColor::Blue => 1,
        InkColor::Green => 2,
    }
}

/// Left to right on the keyboard.
const KEY_ORDER: [ResponseKey; 3] = [ResponseKey::Comma, ResponseKey::Period, ResponseKey::Slash];

fn color_for_key(mapping: &KeyMapping<3>, key: ResponseKey) -> Option<InkColor> {
    mapping.slot_of(key).map(|s| InkColor::ALL[s])
}

/// Three congruent and six incongruent word/ink pairs. The ink decides the
/// answer.
pub fn stroop_stimuli(mapping: &KeyMapping<3>) -> Vec<StimulusSpec> {
    let congruent = InkColor::ALL.iter().map(|c| (*c, *c));
    let incongruent = InkColor::ALL.iter().flat_map(|word| {
        InkColor::ALL
            .iter()
            .filter(move |ink| *ink != word)
            .map(move |ink| (*word, *ink))
    });
    congruent
        .chain(incongruent)
        .map(|(stim_word, stim_color)| {
            StimulusSpec::new(
                StimulusType::Stroop {
                    stim_word,
                    stim_color,
                },
                mapping.slots()[slot(stim_color)].key,
            )
        })
        .collect()
}

fn reminder(mapping: &KeyMapping<3>) -> String {
    let items: String = KEY_ORDER
        .into_iter()
        .filter_map(|key| color_for_key(mapping, key).map(|color| (key, color)))
        .map(|(key, color)| {
            format!(
                "<li><span class=\"large\" style=\"color:{};\">WORD</span>: {}</li>",
                color.hex(),
                key.description()
            )
        })
        .collect();
    format!("<ul class=\"list-text\">{items}</ul>")
}

fn instructions(mapping: &KeyMapping<3>) -> Vec<String> {
    let finger_rules: String = KEY_ORDER
        .into_iter()
        .filter_map(|key| mapping.slot_of(key))
        .map(|slot| {
            let color = InkColor::ALL[slot];
            format!(
                "<p class='block-text'>Press your <b>{}</b> if the color is \
                 <span style='color:{}'>{}</span>.</p>",
                mapping.slots()[slot].finger.name(),
                color.hex(),
                color.name()
            )
        })
        .collect();

    vec![
        format!(
            "<div class='centerbox'>\
             <p class=\"block-text\">{}</p>\
             <p class='block-text'>During this task, on each trial you will be presented with a \
             single word on the screen. This word will be <b>'RED'</b>, <b>'BLUE'</b>, or \
             <b>'GREEN'</b>.</p>\
             <p class='block-text'>Each word will appear in colored ink. The color of the word \
             may not match the word itself. For example, you might see the word 'RED' in green \
             ink, like this: <span style='color:#70FF70'>RED</span>.</p>\
             <p class='block-text'>Your task is to identify the <b>color of the ink in which the \
             word is displayed</b>, not the word itself. So, if you see the word <b>'RED'</b> in \
             green ink, you should press the key corresponding to <b>green</b>.</p>\
             {finger_rules}\
             </div>",
            finger_placement("Place", mapping.slots())
        ),
        "<div class='centerbox'>\
         <p class='block-text'>We'll start with a practice round. During practice, you will \
         receive feedback and a reminder of the rules. These will be taken out for the test, so \
         make sure you understand the instructions before moving on.</p>\
         <p class = block-text>Try to respond as quickly and accurately as possible.</p>\
         </div>"
            .to_string(),
    ]
}

pub(super) fn definition(group_index: i32) -> Result<TaskDefinition, KeyMappingError> {
    let mapping = KeyMapping::stroop(group_index)?;
    let reminder = reminder(&mapping);
    Ok(TaskDefinition {
        kind: TaskKind::Stroop,
        stimuli: stroop_stimuli(&mapping),
        choices: mapping.choices(),
        instruction_pages: instructions(&mapping),
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
    use conflict_core::Condition;
    use std::collections::HashSet;

    #[test]
    fn ink_colour_picks_the_key() {
        let mapping = KeyMapping::stroop(10).unwrap();
        for spec in stroop_stimuli(&mapping) {
            let StimulusType::Stroop { stim_color, .. } = spec.stimulus else {
                panic!("stroop pool holds word/ink pairs only");
            };
            assert_eq!(color_for_key(&mapping, spec.correct_response), Some(stim_color));
        }
    }

    #[test]
    fn pool_has_every_word_ink_pair_once() {
        let specs = stroop_stimuli(&KeyMapping::stroop(0).unwrap());
        assert_eq!(specs.len(), 9);
        let distinct: HashSet<_> = specs.iter().map(|s| s.stimulus.clone()).collect();
        assert_eq!(distinct.len(), 9);
        let incongruent = specs
            .iter()
            .filter(|s| s.condition == Condition::Incongruent)
            .count();
        assert_eq!(incongruent, 6);
    }

    #[test]
    fn reminder_lists_keys_in_keyboard_order() {
        let text = reminder(&KeyMapping::stroop(12).unwrap());
        let green = text.find("#70FF70").unwrap();
        let red = text.find("#FF7070").unwrap();
        let blue = text.find("#7070FF").unwrap();
        assert!(green < red && red < blue);
    }

    #[test]
    fn instructions_span_two_pages() {
        let pages = instructions(&KeyMapping::stroop(0).unwrap());
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains(
            "Press your <b>ring finger</b> if the color is <span style='color:#70FF70'>green</span>"
        ));
    }

    #[test]
    fn finger_rules_follow_keyboard_order() {
        let pages = instructions(&KeyMapping::stroop(10).unwrap());
        let index = pages[0].find("<b>index finger</b> if the color is").unwrap();
        let middle = pages[0].find("<b>middle finger</b> if the color is").unwrap();
        let ring = pages[0].find("<b>ring finger</b> if the color is").unwrap();
        assert!(index < middle && middle < ring);
        assert!(pages[0][index..middle].contains(">green</span>"));
        assert!(pages[0][ring..].contains(">red</span>"));
    }
}
