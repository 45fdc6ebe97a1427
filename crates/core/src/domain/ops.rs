use serde::{Deserialize, Serialize};

use crate::domain::issue::IssueId;
use crate::domain::session::SessionId;

/// Three-step qualitative scale shared by impact, urgency and risk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    pub fn weight(&self) -> u32 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriorityLane {
    P0,
    P1,
    P2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpsSourceType {
    IssueFix,
    FeatureBuild,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpsAction {
    ApplyNow,
    CreateFollowUpTask,
    DeferToBacklog,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reproducibility {
    Sometimes,
    Reproducible,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsBoardItem {
    pub id: String,
    pub source_type: OpsSourceType,
    pub priority: PriorityLane,
    pub title: String,
    pub impact: Level,
    pub urgency: Level,
    pub risk: Level,
    pub confidence: f64,
    pub score: f64,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<IssueId>,
    pub suggested_action: OpsAction,
    pub available_actions: Vec<OpsAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_business_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_estimate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reproducibility: Option<Reproducibility>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsBoardPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub priority_queue: Vec<OpsBoardItem>,
    pub fix_candidates: Vec<OpsBoardItem>,
    pub immediate_fixes: Vec<OpsBoardItem>,
    pub feature_build_candidates: Vec<OpsBoardItem>,
    pub action_recommendations: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_sessions: usize,
    pub submitted: usize,
    pub blocked: usize,
    pub resolved: usize,
    pub issue_count: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStateSummary {
    pub van_count: usize,
    pub option_count: usize,
    pub active_sessions: usize,
    pub active_issues: usize,
}
