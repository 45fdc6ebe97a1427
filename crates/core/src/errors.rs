use thiserror::Error;

use crate::domain::issue::IssueId;
use crate::domain::journey::JourneyStep;
use crate::domain::session::SessionId;
use crate::domain::vehicle::OptionId;

pub const SUBMISSION_REJECTED_MESSAGE: &str = "Please complete the guided flow before submitting.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("session `{0}` not found")]
    SessionNotFound(SessionId),
    #[error("option `{0}` not found in catalog")]
    OptionNotFound(OptionId),
    #[error("issue `{0}` not found")]
    IssueNotFound(IssueId),
    #[error("issue `{0}` is missing or already fixed")]
    FixNotApplicable(IssueId),
    #[error("submission rejected at journey step {step}")]
    SubmissionRejected { step: JourneyStep },
}

impl DomainError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound(_)
                | Self::OptionNotFound(_)
                | Self::IssueNotFound(_)
                | Self::FixNotApplicable(_)
        )
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "The requested session, option or issue does not exist.",
            Self::BadRequest { message, .. } if message == SUBMISSION_REJECTED_MESSAGE => {
                SUBMISSION_REJECTED_MESSAGE
            }
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::NotFound { correlation_id, .. }
            | Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<DomainError> for InterfaceError {
    fn from(value: DomainError) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(DomainError::SubmissionRejected { .. }) => {
                Self::BadRequest { message: SUBMISSION_REJECTED_MESSAGE.to_owned(), correlation_id }
            }
            ApplicationError::Domain(error) => {
                Self::NotFound { message: error.to_string(), correlation_id }
            }
            ApplicationError::Integration(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::issue::IssueId;
    use crate::domain::journey::JourneyStep;
    use crate::domain::session::SessionId;
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn unknown_session_maps_to_not_found_with_correlation_id() {
        let interface = ApplicationError::from(DomainError::SessionNotFound(SessionId(
            "missing".to_owned(),
        )))
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::NotFound { ref correlation_id, .. } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The requested session, option or issue does not exist."
        );
    }

    #[test]
    fn early_submission_surfaces_guided_flow_message() {
        let interface =
            ApplicationError::from(DomainError::SubmissionRejected { step: JourneyStep::Options })
                .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
        assert_eq!(interface.user_message(), "Please complete the guided flow before submitting.");
    }

    #[test]
    fn spent_fix_is_reported_as_not_found() {
        let error = DomainError::FixNotApplicable(IssueId("issue-1".to_owned()));
        assert!(error.is_not_found());
        assert!(matches!(InterfaceError::from(error), InterfaceError::NotFound { .. }));
    }

    #[test]
    fn integration_error_maps_to_service_unavailable() {
        let interface = ApplicationError::Integration("summarizer timed out".to_owned())
            .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "req-3");
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            ApplicationError::Configuration("invalid api key".to_owned()).into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
