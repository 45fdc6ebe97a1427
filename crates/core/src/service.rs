//! Guided session service
//!
//! Facade over the catalog, recommendation engine, journey flow, validator and ops board.
//! Every mutating operation ends with a full projection rebuild so that the chosen van,
//! the total price and the journey view are never stale.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cpq::catalog::Catalog;
use crate::cpq::constraints::{ConstraintViolation, DeterministicConstraintEngine};
use crate::cpq::pricing::{format_money, price_configuration, DeterministicPricingEngine};
use crate::cpq::{
    build_recommendation, choose_van, CpqEvaluationInput, CpqRuntime, DeterministicCpqRuntime,
    Recommendation, ScoringProfile,
};
use crate::domain::issue::{Issue, IssueId, IssueType};
use crate::domain::journey::{GuidedJourneyState, JourneyCard, JourneyStep};
use crate::domain::ops::{Kpis, OpsBoardPayload, SeedStateSummary};
use crate::domain::session::{
    normalize_moods, CapturedInputs, Session, SessionId, SessionLog, SessionStatus,
};
use crate::domain::vehicle::{BudgetBand, OptionId, OptionItem, Region, Terrain};
use crate::errors::{DomainError, SUBMISSION_REJECTED_MESSAGE};
use crate::flows::{FlowEngine, GuidedAction, GuidedFlow};
use crate::ops::build_board;
use crate::store::SessionStore;

pub const DEFAULT_OCCUPANCY: u32 = 2;
pub const DEFAULT_CUSTOMER_NAME: &str = "Guest";
pub const DEFAULT_TERRAIN: Terrain = Terrain::City;
pub const DEFAULT_REGION: Region = Region::Co;

/// Customer profile supplied when a guided session starts. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuidedSessionInput {
    pub customer_name: Option<String>,
    pub budget: Option<Decimal>,
    pub budget_band: Option<BudgetBand>,
    pub occupancy: Option<u32>,
    pub terrain: Option<Terrain>,
    pub region: Option<Region>,
    pub trip_style: Option<String>,
    pub moods: Option<Vec<String>>,
}

/// Field updates, option changes and at most one quick action for an existing session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuidedSessionUpdate {
    pub action: Option<GuidedAction>,
    pub customer_name: Option<String>,
    pub budget: Option<Decimal>,
    pub budget_band: Option<BudgetBand>,
    pub occupancy: Option<u32>,
    pub terrain: Option<Terrain>,
    pub region: Option<Region>,
    pub trip_style: Option<String>,
    pub moods: Option<Vec<String>>,
    pub option_id: Option<OptionId>,
    pub option_ids: Option<Vec<OptionId>>,
}

/// Already-resolved session fields, as accepted by [`GuidedSessionService::create_session`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionDraft {
    pub customer_name: String,
    pub budget: Decimal,
    pub occupancy: u32,
    pub terrain: Terrain,
    pub region: Region,
    pub moods: Vec<String>,
    pub trip_style: Option<String>,
    pub captured_inputs: Option<CapturedInputs>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub session: Session,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<Issue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<SessionLog>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidedSessionView {
    pub session: Session,
    pub recommendation: Recommendation,
    pub available_options: Vec<OptionItem>,
    pub journey_state: GuidedJourneyState,
    pub next_question: String,
    pub required_inputs: Vec<String>,
    pub step_cards: Vec<JourneyCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionResult>,
}

impl GuidedSessionView {
    fn new(session: &Session, recommendation: Recommendation) -> Self {
        Self {
            session: session.clone(),
            available_options: recommendation.options.clone(),
            recommendation,
            journey_state: session.journey.clone(),
            next_question: session.journey.next_question.clone(),
            required_inputs: session.journey.required_inputs.clone(),
            step_cards: session.journey.step_cards.clone(),
            submission_error: None,
            submission: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResetAck {
    pub status: String,
}

/// Explicit positive amount wins, then the band ceiling, then the balanced ceiling.
pub fn resolve_budget(amount: Option<Decimal>, band: Option<BudgetBand>) -> Decimal {
    amount
        .filter(|value| *value > Decimal::ZERO)
        .or_else(|| band.map(|band| band.ceiling()))
        .unwrap_or_else(|| BudgetBand::Balanced.ceiling())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

/// A zero or negative amount counts as not supplied.
fn positive_budget(amount: Option<Decimal>) -> Option<Decimal> {
    amount.filter(|value| *value > Decimal::ZERO)
}

/// Clearing the last selected option sends the journey back to option selection.
fn emptied_selection_directive(had_selection: bool, session: &Session) -> Option<JourneyStep> {
    (had_selection && session.selected_option_ids.is_empty()).then_some(JourneyStep::Options)
}

fn record_rejected_submit(session: &mut Session) -> JourneyStep {
    let step = session.journey.step;
    session.record(SessionLog::warn(
        "submission_rejected",
        format!("Submit requested at step {step}; guided flow incomplete."),
    ));
    warn!(
        event_name = "guided.submission.rejected",
        session_id = %session.id,
        step = %step,
        "submit before final step"
    );
    step
}

type CpqEngines =
    DeterministicCpqRuntime<DeterministicConstraintEngine, DeterministicPricingEngine>;

pub struct GuidedSessionService {
    catalog: Catalog,
    store: SessionStore,
    flow: FlowEngine<GuidedFlow>,
    cpq: CpqEngines,
}

impl Default for GuidedSessionService {
    fn default() -> Self {
        Self::new(Catalog::seeded())
    }
}

/// Re-scores the van, reprices the selection and rebuilds the journey view.
fn recompute(
    catalog: &Catalog,
    flow: &FlowEngine<GuidedFlow>,
    session: &mut Session,
    directive: Option<JourneyStep>,
) -> Recommendation {
    let profile = ScoringProfile {
        budget: session.budget,
        terrain: session.terrain,
        region: session.region,
        moods: &session.moods,
    };
    let choice = choose_van(catalog, &profile);
    if choice.is_fallback() {
        debug!(
            event_name = "guided.van.fallback",
            session_id = %session.id,
            van_id = %choice.van().id,
            "no eligible van, using catalog fallback"
        );
    }
    let van = choice.van();

    let recommendation = build_recommendation(catalog, &van.tags, session.terrain, &session.moods);
    let selected = catalog.resolve_options(&session.selected_option_ids);

    session.chosen_van_id = van.id.clone();
    session.total_price = price_configuration(van, &selected);
    session.journey = flow.project(session, van, &recommendation, directive);
    recommendation
}

impl GuidedSessionService {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            store: SessionStore::new(),
            flow: FlowEngine::default(),
            cpq: DeterministicCpqRuntime::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn start_session(&mut self, input: GuidedSessionInput) -> GuidedSessionView {
        let customer_name = non_blank(input.customer_name.as_deref());
        let trip_style = non_blank(input.trip_style.as_deref());
        let captured_inputs = CapturedInputs {
            customer_name: customer_name.is_some(),
            trip_style: trip_style.is_some(),
            budget_band: positive_budget(input.budget).is_some() || input.budget_band.is_some(),
            terrain: input.terrain.is_some(),
            region: input.region.is_some(),
        };

        let draft = SessionDraft {
            customer_name: customer_name.unwrap_or_default(),
            budget: resolve_budget(input.budget, input.budget_band),
            occupancy: input.occupancy.unwrap_or(DEFAULT_OCCUPANCY).max(1),
            terrain: input.terrain.unwrap_or(DEFAULT_TERRAIN),
            region: input.region.unwrap_or(DEFAULT_REGION),
            moods: input.moods.unwrap_or_default(),
            trip_style,
            captured_inputs: Some(captured_inputs),
        };

        let view = self.create_session(draft);
        info!(
            event_name = "guided.session.started",
            session_id = %view.session.id,
            step = %view.journey_state.step,
            chosen_van = %view.session.chosen_van_id,
            "guided session started"
        );
        view
    }

    pub fn create_session(&mut self, draft: SessionDraft) -> GuidedSessionView {
        let now = Utc::now();
        let customer_name = if draft.customer_name.trim().is_empty() {
            DEFAULT_CUSTOMER_NAME.to_string()
        } else {
            draft.customer_name
        };

        let mut session = Session {
            id: SessionId::generate(),
            customer_name,
            budget: draft.budget,
            occupancy: draft.occupancy,
            terrain: draft.terrain,
            region: draft.region,
            trip_style: draft.trip_style,
            moods: normalize_moods(&draft.moods),
            chosen_van_id: self.catalog.first_van().id.clone(),
            selected_option_ids: Vec::new(),
            total_price: Decimal::ZERO,
            status: SessionStatus::Draft,
            journey: GuidedJourneyState::default(),
            captured_inputs: draft.captured_inputs.unwrap_or_default(),
            logs: vec![SessionLog::info("session_created", "Session initialized")],
            created_at: now,
            updated_at: now,
        };

        let recommendation = recompute(&self.catalog, &self.flow, &mut session, None);
        let view = GuidedSessionView::new(&session, recommendation);
        self.store.insert_session(session);
        view
    }

    pub fn get_session(&self, session_id: &SessionId) -> Result<&Session, DomainError> {
        self.store
            .session(session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))
    }

    pub fn refresh_session(
        &mut self,
        session_id: &SessionId,
    ) -> Result<GuidedSessionView, DomainError> {
        let session = self
            .store
            .session_mut(session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))?;

        let recommendation = recompute(&self.catalog, &self.flow, session, None);
        session.touch();
        Ok(GuidedSessionView::new(session, recommendation))
    }

    pub fn advance_session(
        &mut self,
        session_id: &SessionId,
        update: GuidedSessionUpdate,
    ) -> Result<GuidedSessionView, DomainError> {
        let session = self
            .store
            .session_mut(session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))?;
        let had_selection = !session.selected_option_ids.is_empty();

        if let Some(name) = non_blank(update.customer_name.as_deref()) {
            session.customer_name = name;
            session.captured_inputs.customer_name = true;
        }
        if let Some(style) = non_blank(update.trip_style.as_deref()) {
            session.trip_style = Some(style);
            session.captured_inputs.trip_style = true;
        }
        if let Some(terrain) = update.terrain {
            session.terrain = terrain;
            session.captured_inputs.terrain = true;
        }
        if let Some(region) = update.region {
            session.region = region;
            session.captured_inputs.region = true;
        }
        if let Some(occupancy) = update.occupancy.filter(|value| *value > 0) {
            session.occupancy = occupancy;
        }
        let budget = positive_budget(update.budget);
        if budget.is_some() || update.budget_band.is_some() {
            session.budget = resolve_budget(budget, update.budget_band);
            session.captured_inputs.budget_band = true;
        }
        if let Some(moods) = &update.moods {
            session.moods = normalize_moods(moods);
        }
        if let Some(option_ids) = update.option_ids {
            let (known, unknown): (Vec<OptionId>, Vec<OptionId>) =
                option_ids.into_iter().partition(|id| self.catalog.option_by_id(id).is_some());
            for id in unknown {
                warn!(
                    event_name = "guided.option.unknown",
                    session_id = %session.id,
                    option_id = %id,
                    "ignoring unknown option id"
                );
            }
            session.replace_options(known);
        }
        if let Some(option_id) = &update.option_id {
            if self.catalog.option_by_id(option_id).is_some() {
                session.toggle_option(option_id);
            } else {
                warn!(
                    event_name = "guided.option.unknown",
                    session_id = %session.id,
                    option_id = %option_id,
                    "ignoring unknown option id"
                );
                session.record(SessionLog::warn(
                    "option_unknown",
                    format!("Ignored unknown option {option_id}."),
                ));
            }
        }

        let mut directive = None;
        let mut closes_open_issues = false;
        if let Some(action) = update.action.filter(|action| *action != GuidedAction::Submit) {
            let outcome = self.flow.apply_action(session, action);
            directive = outcome.directive;
            closes_open_issues = outcome.closes_open_issues;
        }
        let directive = directive.or_else(|| emptied_selection_directive(had_selection, session));

        let recommendation = recompute(&self.catalog, &self.flow, session, directive);
        let step = session.journey.step;
        let action_label = update.action.map_or("field_update", |action| action.as_str());

        let mut submission_error = None;
        let wants_submit = update.action == Some(GuidedAction::Submit);
        if wants_submit && step < JourneyStep::Review {
            record_rejected_submit(session);
            submission_error = Some(SUBMISSION_REJECTED_MESSAGE.to_string());
        }

        if closes_open_issues {
            let closed = self.store.close_open_issues(session_id);
            info!(
                event_name = "guided.session.reset",
                session_id = %session_id,
                closed_issues = closed,
                "guided flow restarted"
            );
        }

        let submission = if wants_submit && submission_error.is_none() {
            Some(self.run_submission(session_id)?)
        } else {
            None
        };

        let session = self
            .store
            .session_mut(session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))?;
        session.record(SessionLog::info(
            "guided_update",
            format!("Session updated via guided action ({action_label})."),
        ));
        session.touch();
        info!(
            event_name = "guided.session.advanced",
            session_id = %session_id,
            action = action_label,
            step = %session.journey.step,
            "guided session advanced"
        );

        let mut view = GuidedSessionView::new(session, recommendation);
        view.submission_error = submission_error;
        view.submission = submission;
        Ok(view)
    }

    pub fn toggle_option(
        &mut self,
        session_id: &SessionId,
        option_id: &OptionId,
    ) -> Result<Session, DomainError> {
        let option = self
            .catalog
            .option_by_id(option_id)
            .ok_or_else(|| DomainError::OptionNotFound(option_id.clone()))?;
        let session = self
            .store
            .session_mut(session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))?;

        let had_selection = !session.selected_option_ids.is_empty();
        let selected = session.toggle_option(option_id);
        let verb = if selected { "added" } else { "removed" };
        session.record(SessionLog::info("option_toggled", format!("{} {verb}.", option.name)));
        let directive = emptied_selection_directive(had_selection, session);
        recompute(&self.catalog, &self.flow, session, directive);
        session.touch();

        info!(
            event_name = "guided.option.toggled",
            session_id = %session_id,
            option_id = %option_id,
            selected,
            total_price = %session.total_price,
            "option toggled"
        );
        Ok(session.clone())
    }

    /// Validates the final configuration; only allowed once the journey reached review.
    pub fn submit_session(
        &mut self,
        session_id: &SessionId,
    ) -> Result<SubmissionResult, DomainError> {
        let session = self
            .store
            .session_mut(session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))?;

        if session.journey.step < JourneyStep::Review {
            let step = record_rejected_submit(session);
            return Err(DomainError::SubmissionRejected { step });
        }

        self.run_submission(session_id)
    }

    fn run_submission(&mut self, session_id: &SessionId) -> Result<SubmissionResult, DomainError> {
        let session = self
            .store
            .session(session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))?;

        let van = self.catalog.van_or_first(&session.chosen_van_id);
        let evaluation = self.cpq.evaluate_configuration(CpqEvaluationInput {
            van,
            terrain: session.terrain,
            selected: self.catalog.resolve_options(&session.selected_option_ids),
        });
        let total = evaluation.pricing.total;
        let budget = session.budget;

        if !evaluation.constraints.valid {
            let conflicts: Vec<SessionLog> = evaluation
                .constraints
                .violations
                .iter()
                .map(|violation: &ConstraintViolation| {
                    SessionLog::error("compatibility_violation", violation.message.clone())
                })
                .collect();
            let issue = self.record_issue(session_id, IssueType::CompatibilityError, || {
                Issue::compatibility(session_id.clone())
            });

            let session = self.session_mut(session_id)?;
            session.status = SessionStatus::Blocked;
            session.logs.extend(conflicts.iter().cloned());
            session.record(SessionLog::error("session_blocked", "Validation failed"));
            session.touch();
            warn!(
                event_name = "guided.submission.blocked",
                session_id = %session_id,
                conflicts = conflicts.len(),
                issue_id = %issue.id,
                "submission blocked by compatibility conflicts"
            );

            return Ok(SubmissionResult {
                session: session.clone(),
                status: SessionStatus::Blocked,
                issue: Some(issue),
                conflicts,
            });
        }

        if total > budget {
            let description = format!(
                "Current configuration is {} for a budget of {}.",
                format_money(total),
                format_money(budget)
            );
            let issue = self.record_issue(session_id, IssueType::BudgetPressure, || {
                Issue::budget_pressure(session_id.clone(), description.clone())
            });

            let session = self.session_mut(session_id)?;
            session.status = SessionStatus::NeedsAttention;
            session.record(SessionLog::warn("budget_pressure", description));
            session.touch();
            warn!(
                event_name = "guided.submission.over_budget",
                session_id = %session_id,
                total = %total,
                budget = %budget,
                "submission exceeds budget"
            );

            return Ok(SubmissionResult {
                session: session.clone(),
                status: SessionStatus::NeedsAttention,
                issue: Some(issue),
                conflicts: Vec::new(),
            });
        }

        let session = self.session_mut(session_id)?;
        session.status = SessionStatus::Submitted;
        session.record(SessionLog::info("session_submitted", "Session submitted successfully"));
        session.touch();
        info!(
            event_name = "guided.submission.accepted",
            session_id = %session_id,
            total = %total,
            "session submitted"
        );

        Ok(SubmissionResult {
            session: session.clone(),
            status: SessionStatus::Submitted,
            issue: None,
            conflicts: Vec::new(),
        })
    }

    fn session_mut(&mut self, session_id: &SessionId) -> Result<&mut Session, DomainError> {
        self.store
            .session_mut(session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))
    }

    /// Returns the open issue of this type for the session, creating it when none exists.
    fn record_issue<F>(&mut self, session_id: &SessionId, issue_type: IssueType, build: F) -> Issue
    where
        F: FnOnce() -> Issue,
    {
        if let Some(existing) = self.store.open_issue(session_id, issue_type) {
            debug!(
                event_name = "ops.issue.deduplicated",
                session_id = %session_id,
                issue_id = %existing.id,
                "open issue already recorded"
            );
            return existing.clone();
        }

        let issue = build();
        info!(
            event_name = "ops.issue.recorded",
            session_id = %session_id,
            issue_id = %issue.id,
            issue_type = issue_type.as_str(),
            "issue recorded"
        );
        self.store.insert_issue(issue.clone());
        issue
    }

    /// Applies the remediation for an open issue and marks it fixed.
    pub fn apply_fix(&mut self, issue_id: &IssueId) -> Result<Issue, DomainError> {
        let issue = self
            .store
            .issue(issue_id)
            .filter(|issue| issue.is_open())
            .cloned()
            .ok_or_else(|| DomainError::FixNotApplicable(issue_id.clone()))?;

        let session = self
            .store
            .session_mut(&issue.session_id)
            .ok_or_else(|| DomainError::SessionNotFound(issue.session_id.clone()))?;

        match issue.issue_type {
            IssueType::CompatibilityError => {
                let terrain = session.terrain.as_str();
                let catalog = &self.catalog;
                session.selected_option_ids.retain(|id| {
                    catalog
                        .option_by_id(id)
                        .is_some_and(|option| !option.is_incompatible_with(terrain))
                });
                session.record(SessionLog::info(
                    "compatibility_fix_applied",
                    "Removed options that conflict with the trip terrain.",
                ));
            }
            IssueType::BudgetPressure => {
                session.selected_option_ids.truncate(1);
                session.record(SessionLog::info(
                    "budget_fix_applied",
                    "Removed lower-priority options to relieve budget pressure.",
                ));
            }
            IssueType::ConfigStall => {
                session.record(SessionLog::info(
                    "stall_fix_applied",
                    "Cleared configuration stall.",
                ));
            }
        }

        recompute(&self.catalog, &self.flow, session, None);
        session.status = SessionStatus::Resolved;
        session.touch();
        let total_price = session.total_price;

        let fixed = self
            .store
            .issue_mut(issue_id)
            .ok_or_else(|| DomainError::IssueNotFound(issue_id.clone()))?;
        fixed.fixed = true;

        info!(
            event_name = "ops.fix.applied",
            session_id = %fixed.session_id,
            issue_id = %issue_id,
            issue_type = fixed.issue_type.as_str(),
            total_price = %total_price,
            "issue fix applied"
        );
        Ok(fixed.clone())
    }

    pub fn ops_board(&self, session_filter: Option<SessionId>) -> OpsBoardPayload {
        let status_of = |id: &SessionId| self.store.session(id).map(|session| session.status);
        match &session_filter {
            Some(session_id) => {
                let issues: Vec<&Issue> = self.store.issues_for_session(session_id).collect();
                build_board(issues, status_of, session_filter.clone())
            }
            None => build_board(self.store.issues(), status_of, None),
        }
    }

    pub fn kpis(&self) -> Kpis {
        let count = |status: SessionStatus| {
            self.store.sessions().filter(|session| session.status == status).count()
        };
        Kpis {
            total_sessions: self.store.session_count(),
            submitted: count(SessionStatus::Submitted),
            blocked: count(SessionStatus::Blocked),
            resolved: count(SessionStatus::Resolved),
            issue_count: self.store.issue_count(),
        }
    }

    pub fn issue_list(&self) -> Vec<Issue> {
        self.store.issues().cloned().collect()
    }

    pub fn issues_for_session(&self, session_id: &SessionId) -> Vec<Issue> {
        self.store.issues_for_session(session_id).cloned().collect()
    }

    pub fn seed_state_summary(&self) -> SeedStateSummary {
        SeedStateSummary {
            van_count: self.catalog.vans().len(),
            option_count: self.catalog.options().len(),
            active_sessions: self.store.session_count(),
            active_issues: self.store.issue_count(),
        }
    }

    pub fn reset_all(&mut self) -> ResetAck {
        let sessions = self.store.session_count();
        let issues = self.store.issue_count();
        self.store.clear();
        warn!(event_name = "system.state.reset", sessions, issues, "in-memory state cleared");
        ResetAck { status: "reset".to_string() }
    }
}
