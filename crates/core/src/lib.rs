pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod ops;
pub mod service;
pub mod store;
pub mod summary;

pub use cpq::catalog::{Catalog, CatalogError};
pub use cpq::{CpqRuntime, DeterministicCpqRuntime, Recommendation};
pub use domain::issue::{Issue, IssueId, IssueType};
pub use domain::journey::{GuidedJourneyState, JourneyStep};
pub use domain::ops::{Kpis, OpsBoardPayload, SeedStateSummary};
pub use domain::session::{Session, SessionId, SessionStatus};
pub use domain::vehicle::{OptionId, OptionItem, VanId, VanModel};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::GuidedAction;
pub use service::{
    GuidedSessionInput, GuidedSessionService, GuidedSessionUpdate, GuidedSessionView, ResetAck,
    SessionDraft, SubmissionResult,
};
pub use summary::{fallback_summary, submission_summary_text, FallbackSummarizer, Summarizer};
