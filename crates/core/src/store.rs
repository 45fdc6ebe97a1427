use std::collections::HashMap;

use crate::domain::issue::{Issue, IssueId, IssueType};
use crate::domain::session::{Session, SessionId};

/// In-memory keyed store for sessions and issues.
///
/// Owned by one service instance; nothing here is process-global, so tests get isolated
/// stores by constructing their own.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
    issues: HashMap<IssueId, Issue>,
    issue_order: Vec<IssueId>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_session(&mut self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    pub fn session(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn session_mut(&mut self, session_id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(session_id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn insert_issue(&mut self, issue: Issue) {
        if !self.issues.contains_key(&issue.id) {
            self.issue_order.push(issue.id.clone());
        }
        self.issues.insert(issue.id.clone(), issue);
    }

    pub fn issue(&self, issue_id: &IssueId) -> Option<&Issue> {
        self.issues.get(issue_id)
    }

    pub fn issue_mut(&mut self, issue_id: &IssueId) -> Option<&mut Issue> {
        self.issues.get_mut(issue_id)
    }

    /// All issues, open and fixed, in detection order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issue_order.iter().filter_map(|id| self.issues.get(id))
    }

    pub fn issues_for_session<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues().filter(move |issue| &issue.session_id == session_id)
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// The unfixed issue of `issue_type` owned by the session, if any.
    pub fn open_issue(&self, session_id: &SessionId, issue_type: IssueType) -> Option<&Issue> {
        self.issues().find(|issue| {
            &issue.session_id == session_id && issue.issue_type == issue_type && issue.is_open()
        })
    }

    /// Marks every open issue of the session fixed; returns how many changed.
    pub fn close_open_issues(&mut self, session_id: &SessionId) -> usize {
        let mut closed = 0;
        for issue in self.issues.values_mut() {
            if &issue.session_id == session_id && issue.is_open() {
                issue.fixed = true;
                closed += 1;
            }
        }
        closed
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.issues.clear();
        self.issue_order.clear();
    }
}
