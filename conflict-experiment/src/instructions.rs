use std::time::Duration;

/// Outcome of one pass over the instruction pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionDecision {
    Repeat,
    Continue,
}

impl InstructionDecision {
    pub fn message(&self) -> &'static str {
        match self {
            InstructionDecision::Repeat => {
                "<p class=block-text>Read through instructions too quickly. \
                 Please take your time and make sure you understand the instructions.</p>\
                 <p class=block-text>Press <i>enter</i> to continue.</p>"
            }
            InstructionDecision::Continue => {
                "<p class=block-text>Done with instructions. Press <i>enter</i> to continue.</p>"
            }
        }
    }
}

pub const WELCOME: &str = "<p class=\"center-block-text\">Welcome! This experiment will take \
around 7 minutes.</p>\
<p class=\"center-block-text\">To avoid technical issues, please keep the experiment tab (on \
Chrome or Firefox) active and in fullscreen mode for the whole duration of each task.</p>\
<p class=\"center-block-text\"> Press <i>enter</i> to begin.</p>";

pub const END: &str = "<div class=\"centerbox\">\
<p class=\"center-block-text\">Thanks for completing this task!</p>\
<p class=\"center-block-text\">Press <i>enter</i> to continue.</p>\
</div>";

/// Sends participants back through the instructions when they skimmed them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstructionGate {
    threshold: Duration,
    page_timeout: Duration,
}

impl InstructionGate {
    pub fn new(threshold_secs: f64, page_timeout: Duration) -> Self {
        Self {
            threshold: Duration::from_secs_f64(threshold_secs),
            page_timeout,
        }
    }

    /// `page_times_ms` holds one entry per page; `None` means the page timed
    /// out and counts as the full timeout.
    pub fn evaluate(&self, page_times_ms: &[Option<f64>]) -> InstructionDecision {
        let timeout_ms = self.page_timeout.as_secs_f64() * 1000.0;
        let total_ms: f64 = page_times_ms.iter().map(|t| t.unwrap_or(timeout_ms)).sum();
        if total_ms <= self.threshold.as_secs_f64() * 1000.0 {
            InstructionDecision::Repeat
        } else {
            InstructionDecision::Continue
        }
    }
}
