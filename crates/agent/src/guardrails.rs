/// Upper bound for a support card; longer model output is treated as off-task.
pub const MAX_SUMMARY_CHARS: usize = 1_200;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow(String),
    Degrade { reason_code: &'static str, fallback_path: &'static str },
}

/// Checks model output before it reaches a support agent.
///
/// The model only rewrites the submission record; it never changes statuses or prices, so
/// a card that is empty or runs far past the expected size is replaced by the fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryGuardrail {
    pub max_chars: usize,
}

impl Default for SummaryGuardrail {
    fn default() -> Self {
        Self { max_chars: MAX_SUMMARY_CHARS }
    }
}

impl SummaryGuardrail {
    pub fn evaluate(&self, output: &str) -> GuardrailDecision {
        let trimmed = output.trim();
        if trimmed.is_empty() {
            return GuardrailDecision::Degrade {
                reason_code: "empty_summary",
                fallback_path: "deterministic_fallback_summary",
            };
        }
        if trimmed.chars().count() > self.max_chars {
            return GuardrailDecision::Degrade {
                reason_code: "summary_too_long",
                fallback_path: "deterministic_fallback_summary",
            };
        }
        GuardrailDecision::Allow(trimmed.to_string())
    }
}
