//! Support summarizer runtime
//!
//! Turns a finished guided session into a short support-handoff card through an LLM, and
//! falls back to the deterministic `[fallback:<id>] <text>` form whenever the model is
//! disabled, slow, failing or off-task.
//!
//! The model never decides anything: statuses, prices and issues are produced by the
//! deterministic core before the summarizer sees them.

pub mod guardrails;
pub mod llm;
pub mod openai;
pub mod summarizer;

pub use llm::LlmClient;
pub use openai::OpenAiResponsesClient;
pub use summarizer::SupportSummarizer;
