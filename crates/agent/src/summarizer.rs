use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use vanguide_core::config::SummarizerConfig;
use vanguide_core::domain::session::SessionId;
use vanguide_core::summary::{fallback_summary, Summarizer};

use crate::guardrails::{GuardrailDecision, SummaryGuardrail};
use crate::llm::LlmClient;
use crate::openai::OpenAiResponsesClient;

pub const SUPPORT_PROMPT_PREFIX: &str =
    "Summarize the customer interaction for support handoff in one compact support card format: ";

/// Model-backed [`Summarizer`] that degrades to the deterministic fallback.
///
/// Timeouts, transport failures and rejected output all produce
/// `[fallback:<id>] <text>`; callers never see an error.
pub struct SupportSummarizer {
    client: Option<Arc<dyn LlmClient>>,
    timeout: Duration,
    guardrail: SummaryGuardrail,
}

impl SupportSummarizer {
    pub fn new(client: Option<Arc<dyn LlmClient>>, timeout: Duration) -> Self {
        Self { client, timeout, guardrail: SummaryGuardrail::default() }
    }

    pub fn fallback_only() -> Self {
        Self::new(None, Duration::from_secs(1))
    }

    pub fn from_config(config: &SummarizerConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = match OpenAiResponsesClient::from_config(config) {
            Ok(Some(client)) => Some(Arc::new(client) as Arc<dyn LlmClient>),
            Ok(None) => None,
            Err(error) => {
                warn!(
                    event_name = "summarizer.client.unavailable",
                    error = %error,
                    "summarizer client could not be built, using fallback"
                );
                None
            }
        };
        Self::new(client, timeout)
    }

    pub fn is_model_backed(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl Summarizer for SupportSummarizer {
    async fn summarize(&self, session_id: &SessionId, text: &str) -> String {
        let Some(client) = &self.client else {
            return fallback_summary(session_id, text);
        };

        let prompt = format!("{SUPPORT_PROMPT_PREFIX}{text}");
        let output = match tokio::time::timeout(self.timeout, client.complete(&prompt)).await {
            Ok(Ok(output)) => output,
            Ok(Err(error)) => {
                warn!(
                    event_name = "summarizer.call.failed",
                    session_id = %session_id,
                    error = %error,
                    "summarizer call failed"
                );
                return fallback_summary(session_id, text);
            }
            Err(_) => {
                warn!(
                    event_name = "summarizer.call.timeout",
                    session_id = %session_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "summarizer call timed out"
                );
                return fallback_summary(session_id, text);
            }
        };

        match self.guardrail.evaluate(&output) {
            GuardrailDecision::Allow(summary) => {
                debug!(
                    event_name = "summarizer.call.completed",
                    session_id = %session_id,
                    "support summary generated"
                );
                summary
            }
            GuardrailDecision::Degrade { reason_code, fallback_path } => {
                warn!(
                    event_name = "summarizer.output.rejected",
                    session_id = %session_id,
                    reason_code,
                    fallback_path,
                    "summary output rejected"
                );
                fallback_summary(session_id, text)
            }
        }
    }
}
