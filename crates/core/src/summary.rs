use async_trait::async_trait;
use serde_json::json;

use crate::domain::session::SessionId;
use crate::service::SubmissionResult;

/// Characters of the session id kept in fallback summaries.
pub const FALLBACK_ID_PREFIX_LEN: usize = 6;

/// Support-handoff summarization capability.
///
/// Implementations must absorb their own failures: the return value is always usable, falling
/// back to [`fallback_summary`] when a remote model is unavailable.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, session_id: &SessionId, text: &str) -> String;
}

pub fn fallback_summary(session_id: &SessionId, text: &str) -> String {
    format!("[fallback:{}] {text}", session_id.short(FALLBACK_ID_PREFIX_LEN))
}

/// Summarizer that never leaves the process.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackSummarizer;

#[async_trait]
impl Summarizer for FallbackSummarizer {
    async fn summarize(&self, session_id: &SessionId, text: &str) -> String {
        fallback_summary(session_id, text)
    }
}

/// Compact JSON handed to the summarizer after a submission.
pub fn submission_summary_text(result: &SubmissionResult) -> String {
    json!({
        "sessionId": result.session.id.0,
        "status": result.status.as_str(),
        "issueCount": usize::from(result.issue.is_some()),
    })
    .to_string()
}
