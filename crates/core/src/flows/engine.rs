use rust_decimal::Decimal;

use crate::cpq::{Recommendation, SAFE_DEFAULT_MOODS};
use crate::domain::journey::{GuidedJourneyState, JourneyStep};
use crate::domain::session::{CapturedInputs, Session, SessionLog, SessionStatus};
use crate::domain::vehicle::VanModel;
use crate::flows::cards;
use crate::flows::states::{ActionOutcome, FlowContext, GuidedAction};

/// Fixed amount `optimize_budget` takes off the working budget.
pub const BUDGET_OPTIMIZATION_STEP: i64 = 8_000;

pub trait FlowDefinition {
    fn resolve_step(&self, context: &FlowContext) -> JourneyStep;
}

/// The five-step guided configuration flow.
#[derive(Clone, Debug, Default)]
pub struct GuidedFlow;

impl FlowDefinition for GuidedFlow {
    fn resolve_step(&self, context: &FlowContext) -> JourneyStep {
        resolve_guided_step(context)
    }
}

fn resolve_guided_step(context: &FlowContext) -> JourneyStep {
    if !context.missing_inputs.is_empty() {
        return JourneyStep::Context;
    }
    if !context.has_moods {
        return JourneyStep::Preferences;
    }
    if context.has_selection {
        return JourneyStep::Review;
    }
    if let Some(step) = context.directive.filter(|step| *step >= JourneyStep::Baseline) {
        return step;
    }
    // review without a selection is only reachable through skip_to_submit or safe_baseline
    if context.previous_step >= JourneyStep::Options {
        return context.previous_step;
    }
    JourneyStep::Baseline
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn context_for(&self, session: &Session, directive: Option<JourneyStep>) -> FlowContext {
        FlowContext {
            missing_inputs: session.captured_inputs.missing(),
            has_moods: !session.moods.is_empty(),
            has_selection: !session.selected_option_ids.is_empty(),
            previous_step: session.journey.step,
            directive,
        }
    }

    /// Rebuilds the journey view from the session's current fields.
    pub fn project(
        &self,
        session: &Session,
        van: &VanModel,
        recommendation: &Recommendation,
        directive: Option<JourneyStep>,
    ) -> GuidedJourneyState {
        let context = self.context_for(session, directive);
        let step = self.flow.resolve_step(&context);

        let required_inputs = match step {
            JourneyStep::Context => {
                context.missing_inputs.iter().map(|field| field.as_str().to_string()).collect()
            }
            JourneyStep::Preferences => vec!["moods".to_string()],
            JourneyStep::Baseline | JourneyStep::Options => vec!["optionSelection".to_string()],
            JourneyStep::Review => vec!["submit".to_string()],
        };

        GuidedJourneyState {
            step,
            next_question: cards::next_question(step, &context.missing_inputs),
            required_inputs,
            step_cards: cards::step_cards(step, session, van, recommendation),
            quick_actions: cards::quick_actions(step),
            completed: step >= JourneyStep::Baseline,
        }
    }

    /// Applies a quick action's field mutations and reports the step it asks for.
    ///
    /// `Submit` is not handled here; it needs the validator and is routed by the service.
    pub fn apply_action(&self, session: &mut Session, action: GuidedAction) -> ActionOutcome {
        match action {
            GuidedAction::StartOver => {
                session.selected_option_ids.clear();
                session.trip_style = None;
                session.captured_inputs = CapturedInputs::none();
                session.status = SessionStatus::Draft;
                session.record(SessionLog::warn(
                    "journey_reset",
                    "Customer restarted the guided flow.",
                ));
                ActionOutcome { directive: Some(JourneyStep::Context), closes_open_issues: true }
            }
            GuidedAction::ShowOptions => {
                session.record(SessionLog::info(
                    "journey_step_advance",
                    "Customer moved to upgrade options.",
                ));
                ActionOutcome::directed(JourneyStep::Options)
            }
            GuidedAction::SkipToSubmit => {
                session.record(SessionLog::info(
                    "journey_step_advance",
                    "Customer skipped option selection.",
                ));
                ActionOutcome::directed(JourneyStep::Review)
            }
            GuidedAction::UseDefaultPreferences => {
                session.moods = SAFE_DEFAULT_MOODS.iter().map(|mood| (*mood).to_string()).collect();
                session.record(SessionLog::info(
                    "journey_step_advance",
                    "Customer accepted safe default preferences.",
                ));
                ActionOutcome::directed(JourneyStep::Baseline)
            }
            GuidedAction::SafeBaseline => {
                session.selected_option_ids.clear();
                session.record(SessionLog::info(
                    "guidance_action",
                    "Customer selected safer baseline configuration.",
                ));
                ActionOutcome::directed(JourneyStep::Review)
            }
            GuidedAction::OptimizeFamily | GuidedAction::OptimizeSafety => {
                let mood = if action == GuidedAction::OptimizeFamily { "family" } else { "safety" };
                if session.add_mood(mood) {
                    session.record(SessionLog::info(
                        "guidance_action",
                        format!("Customer optimized the build for {mood}."),
                    ));
                }
                ActionOutcome::default()
            }
            GuidedAction::OptimizeBudget => {
                let reduced = session.budget - Decimal::from(BUDGET_OPTIMIZATION_STEP);
                session.budget = reduced.max(Decimal::ZERO);
                session.selected_option_ids.clear();
                session.record(SessionLog::info(
                    "guidance_action",
                    "Customer tightened the budget and cleared upgrades.",
                ));
                ActionOutcome::directed(JourneyStep::Options)
            }
            GuidedAction::Submit => ActionOutcome::default(),
        }
    }
}

impl Default for FlowEngine<GuidedFlow> {
    fn default() -> Self {
        Self::new(GuidedFlow)
    }
}
