use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::session::SessionId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IssueId(pub String);

impl IssueId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    CompatibilityError,
    BudgetPressure,
    ConfigStall,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompatibilityError => "compatibility_error",
            Self::BudgetPressure => "budget_pressure",
            Self::ConfigStall => "config_stall",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Medium,
    High,
}

/// A detected problem attached to a session; open until a fix is applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    pub session_id: SessionId,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub title: String,
    pub description: String,
    pub severity: IssueSeverity,
    pub detected_at: DateTime<Utc>,
    pub fixed: bool,
    pub fix_hint: String,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        !self.fixed
    }

    pub fn compatibility(session_id: SessionId) -> Self {
        Self {
            id: IssueId::generate(),
            session_id,
            issue_type: IssueType::CompatibilityError,
            title: "Configuration failed compatibility checks".to_string(),
            description: "A selected option does not match the chosen vehicle profile for this \
                          terrain and build."
                .to_string(),
            severity: IssueSeverity::High,
            detected_at: Utc::now(),
            fixed: false,
            fix_hint: "Enable region-aware compatibility re-check and suggest a compatible \
                       replacement option before submission."
                .to_string(),
        }
    }

    pub fn budget_pressure(session_id: SessionId, description: String) -> Self {
        Self {
            id: IssueId::generate(),
            session_id,
            issue_type: IssueType::BudgetPressure,
            title: "Budget threshold exceeded".to_string(),
            description,
            severity: IssueSeverity::Medium,
            detected_at: Utc::now(),
            fixed: false,
            fix_hint: "Auto-demote one premium option, then recalc and re-submit".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Issue, IssueType};
    use crate::domain::session::SessionId;

    #[test]
    fn issue_type_serializes_under_type_key() {
        let issue = Issue::compatibility(SessionId("s-1".to_string()));
        let value = serde_json::to_value(&issue).expect("serialize issue");

        assert_eq!(value["type"], "compatibility_error");
        assert_eq!(value["severity"], "high");
        assert_eq!(value["sessionId"], "s-1");
        assert_eq!(value["fixed"], false);
        assert_eq!(IssueType::ConfigStall.as_str(), "config_stall");
    }
}
