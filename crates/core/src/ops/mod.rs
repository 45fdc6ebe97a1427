//! Operations board ranking
//!
//! Merges open issues and curated feature signals into one queue ordered by a
//! deterministic impact/urgency/confidence score. The board is stateless: it is rebuilt
//! from the issue list on every request.

mod scoring;
mod signals;

pub use scoring::{priority_label, score, P0_THRESHOLD, P1_THRESHOLD};
pub use signals::{FeatureSignal, FEATURE_SIGNALS};

use crate::domain::issue::{Issue, IssueSeverity, IssueType};
use crate::domain::ops::{
    Level, OpsAction, OpsBoardItem, OpsBoardPayload, OpsSourceType, PriorityLane, Reproducibility,
};
use crate::domain::session::{SessionId, SessionStatus};

/// Confidence assigned to every issue-derived item
pub const ISSUE_FIX_CONFIDENCE: f64 = 0.92;

fn issue_fix_item(issue: &Issue, session_status: Option<SessionStatus>) -> OpsBoardItem {
    let compatibility = issue.issue_type == IssueType::CompatibilityError;
    let urgency = if session_status == Some(SessionStatus::Blocked) {
        Level::High
    } else {
        severity_level(issue)
    };
    let impact = if compatibility { Level::High } else { Level::Medium };
    let score = score(impact, urgency, ISSUE_FIX_CONFIDENCE);

    OpsBoardItem {
        id: format!("fix-{}", issue.id),
        source_type: OpsSourceType::IssueFix,
        priority: priority_label(score),
        title: issue.title.clone(),
        impact,
        urgency,
        risk: Level::Low,
        confidence: ISSUE_FIX_CONFIDENCE,
        score,
        rationale: issue.description.clone(),
        session_id: Some(issue.session_id.clone()),
        issue_id: Some(issue.id.clone()),
        suggested_action: OpsAction::ApplyNow,
        available_actions: vec![
            OpsAction::ApplyNow,
            OpsAction::CreateFollowUpTask,
            OpsAction::DeferToBacklog,
        ],
        eta_business_days: Some(if compatibility { 1 } else { 2 }),
        dependency_estimate: Some(
            if compatibility { "None required" } else { "Option reorder + fallback" }.to_string(),
        ),
        reproducibility: Some(if compatibility {
            Reproducibility::Sometimes
        } else {
            Reproducibility::Reproducible
        }),
    }
}

fn severity_level(issue: &Issue) -> Level {
    match issue.severity {
        IssueSeverity::High => Level::High,
        IssueSeverity::Medium => Level::Medium,
    }
}

fn feature_item(index: usize, signal: &FeatureSignal) -> OpsBoardItem {
    let score = score(signal.impact, signal.urgency, signal.confidence);
    OpsBoardItem {
        id: format!("feature-{}", index + 1),
        source_type: OpsSourceType::FeatureBuild,
        priority: priority_label(score),
        title: signal.title.to_string(),
        impact: signal.impact,
        urgency: signal.urgency,
        risk: signal.risk,
        confidence: signal.confidence,
        score,
        rationale: signal.rationale.to_string(),
        session_id: None,
        issue_id: None,
        suggested_action: OpsAction::CreateFollowUpTask,
        available_actions: vec![OpsAction::CreateFollowUpTask, OpsAction::DeferToBacklog],
        eta_business_days: Some(signal.eta_business_days),
        dependency_estimate: None,
        reproducibility: None,
    }
}

fn action_recommendation(item: &OpsBoardItem) -> String {
    let eta = item.eta_business_days.unwrap_or(0);
    match item.source_type {
        OpsSourceType::IssueFix => {
            let session = item.session_id.as_ref().map_or("N/A", |id| id.0.as_str());
            format!("Bug fix: Apply {} now for session {session} ({eta} day ETA).", item.title)
        }
        OpsSourceType::FeatureBuild => {
            format!("Feature idea: Create follow-up task for {} ({eta} day ETA).", item.title)
        }
    }
}

/// Build the board from already-filtered issues.
///
/// `session_status` resolves the owning session's status; blocked sessions raise urgency.
/// Fixed issues are skipped.
pub fn build_board<'a, I, F>(
    issues: I,
    session_status: F,
    session_filter: Option<SessionId>,
) -> OpsBoardPayload
where
    I: IntoIterator<Item = &'a Issue>,
    F: Fn(&SessionId) -> Option<SessionStatus>,
{
    let fix_candidates: Vec<OpsBoardItem> = issues
        .into_iter()
        .filter(|issue| issue.is_open())
        .map(|issue| issue_fix_item(issue, session_status(&issue.session_id)))
        .collect();

    let feature_build_candidates: Vec<OpsBoardItem> = FEATURE_SIGNALS
        .iter()
        .enumerate()
        .map(|(index, signal)| feature_item(index, signal))
        .collect();

    let mut priority_queue: Vec<OpsBoardItem> =
        fix_candidates.iter().chain(feature_build_candidates.iter()).cloned().collect();
    priority_queue.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| b.confidence.total_cmp(&a.confidence))
    });
    for item in &mut priority_queue {
        item.priority = priority_label(item.score);
    }

    let immediate_fixes = priority_queue
        .iter()
        .filter(|item| item.source_type == OpsSourceType::IssueFix)
        .filter(|item| matches!(item.priority, PriorityLane::P0 | PriorityLane::P1))
        .cloned()
        .collect();
    let action_recommendations = priority_queue.iter().map(action_recommendation).collect();

    OpsBoardPayload {
        session_id: session_filter,
        priority_queue,
        fix_candidates,
        immediate_fixes,
        feature_build_candidates,
        action_recommendations,
    }
}
