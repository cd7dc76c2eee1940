use crate::config::Thresholds;
use crate::instructions::END;
use crate::scoring::BlockStats;

/// Performance problems a block-feedback screen can point out. Always
/// reported in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Warning {
    LowAccuracy,
    MissedResponses,
    SlowResponses,
}

/// Warnings for a block. An indeterminate accuracy counts as low; an
/// indeterminate miss rate or RT raises nothing.
pub fn warnings_for(
    stats: &BlockStats,
    accuracy_threshold: f64,
    thresholds: &Thresholds,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if !stats.accuracy.at_least(accuracy_threshold) {
        warnings.push(Warning::LowAccuracy);
    }
    if stats.missed_response_rate.exceeds(thresholds.missed_response) {
        warnings.push(Warning::MissedResponses);
    }
    if stats.mean_rt_ms.exceeds(thresholds.rt_ms) {
        warnings.push(Warning::SlowResponses);
    }
    warnings
}

/// Task-specific wording spliced into feedback screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackText {
    /// Key reminder listed under the low-accuracy warning.
    pub response_reminder: String,
    /// Where the fingers rest, shown when the test begins.
    pub finger_placement: String,
}

/// Screen shown between blocks
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    BeginPractice,
    RepeatPractice { warnings: Vec<Warning> },
    BeginTest,
    TestProgress {
        completed: usize,
        total: usize,
        warnings: Vec<Warning>,
    },
    Done,
}

const READ_FEEDBACK: &str = "<div class = centerbox><p class = block-text>\
Please take this time to read your feedback! \
This screen will advance automatically in 30 seconds.</p>";

impl Feedback {
    pub fn warnings(&self) -> &[Warning] {
        match self {
            Feedback::RepeatPractice { warnings } | Feedback::TestProgress { warnings, .. } => {
                warnings.as_slice()
            }
            _ => &[],
        }
    }

    pub fn render(&self, text: &FeedbackText) -> String {
        match self {
            Feedback::BeginPractice => {
                "<div class = centerbox>\
                 <p class = center-block-text>Press <i>enter</i> to begin practice.</p>\
                 </div>"
                    .to_string()
            }
            Feedback::RepeatPractice { warnings } => {
                let mut html = READ_FEEDBACK.to_string();
                push_warnings(&mut html, warnings, text);
                html.push_str(
                    "<p class=\"block-text\">We are now going to repeat the practice round.</p>",
                );
                html.push_str("<p class=\"block-text\">Press <i>enter</i> to begin.</p></div>");
                html
            }
            Feedback::BeginTest => format!(
                "<div class=\"centerbox\">\
                 <p class=\"center-block-text\">We will now start the test portion.</p>\
                 <p class=\"block-text\">{}</p>\
                 <p class=\"block-text\">Press <i>enter</i> to continue.</p>\
                 </div>",
                text.finger_placement
            ),
            Feedback::TestProgress {
                completed,
                total,
                warnings,
            } => {
                let mut html = READ_FEEDBACK.to_string();
                html.push_str(&format!(
                    "<p class=block-text>You have completed {completed} out of {total} \
                     blocks of trials.</p>"
                ));
                push_warnings(&mut html, warnings, text);
                html.push_str("<p class=block-text>Press <i>enter</i> to continue.</p></div>");
                html
            }
            Feedback::Done => END.to_string(),
        }
    }
}

fn push_warnings(html: &mut String, warnings: &[Warning], text: &FeedbackText) {
    for warning in warnings {
        match warning {
            Warning::LowAccuracy => html.push_str(&format!(
                "<p class=\"block-text\">Your accuracy is too low. Remember: <br>{}</p>",
                text.response_reminder
            )),
            Warning::MissedResponses => html.push_str(
                "<p class=\"block-text\">You have not been responding to some trials. \
                 Please respond on every trial that requires a response.</p>",
            ),
            Warning::SlowResponses => html.push_str(
                "<p class=\"block-text\">You have been responding too slowly. \
                 Try to respond as quickly and accurately as possible.</p>",
            ),
        }
    }
}
