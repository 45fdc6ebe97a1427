use rust_decimal::Decimal;
use vanguide_core::cpq::pricing::format_money;
use vanguide_core::domain::ops::{OpsSourceType, PriorityLane};
use vanguide_core::domain::vehicle::{BudgetBand, Region, Terrain};
use vanguide_core::{
    DomainError, GuidedAction, GuidedSessionInput, GuidedSessionService, GuidedSessionUpdate,
    GuidedSessionView, IssueType, JourneyStep, OptionId, SessionId, SessionStatus,
};

type GuidedFlowTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
}

fn option(id: &str) -> OptionId {
    OptionId(id.to_string())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn full_context(
    terrain: Terrain,
    region: Region,
    band: BudgetBand,
    moods: &[&str],
) -> GuidedSessionInput {
    GuidedSessionInput {
        customer_name: Some("Avery".to_string()),
        budget_band: Some(band),
        terrain: Some(terrain),
        region: Some(region),
        trip_style: Some("long weekend".to_string()),
        moods: Some(strings(moods)),
        ..GuidedSessionInput::default()
    }
}

/// Water trip in California with a track-only upgrade selected.
fn blocked_water_session(service: &mut GuidedSessionService) -> GuidedFlowTestResult<SessionId> {
    let view = service.start_session(full_context(
        Terrain::Water,
        Region::Ca,
        BudgetBand::Luxury,
        &["water"],
    ));
    let session_id = view.session.id.clone();
    require_eq!(view.session.chosen_van_id.0, "aquilo-orca");

    service
        .toggle_option(&session_id, &option("option-snow-traction"))
        .map_err(|err| format!("toggle failed: {err}"))?;
    Ok(session_id)
}

fn run_action(
    service: &mut GuidedSessionService,
    session_id: &SessionId,
    action: GuidedAction,
) -> GuidedFlowTestResult<GuidedSessionView> {
    service
        .advance_session(
            session_id,
            GuidedSessionUpdate { action: Some(action), ..GuidedSessionUpdate::default() },
        )
        .map_err(|err| format!("{action} failed: {err}"))
}

fn winter_session(service: &mut GuidedSessionService) -> SessionId {
    let view = service.start_session(full_context(
        Terrain::Winter,
        Region::Co,
        BudgetBand::Premium,
        &["family", "winter"],
    ));
    view.session.id
}

fn assert_price_invariant(
    service: &GuidedSessionService,
    session_id: &SessionId,
) -> GuidedFlowTestResult {
    let session = service.get_session(session_id).map_err(|err| err.to_string())?;
    let catalog = service.catalog();
    let van = catalog
        .van_by_id(&session.chosen_van_id)
        .ok_or_else(|| "chosen van should exist in the catalog".to_string())?;
    let options_total: Decimal = catalog
        .resolve_options(&session.selected_option_ids)
        .iter()
        .map(|option| option.delta_price)
        .sum();

    require_eq!(session.total_price, van.base_price + options_total);
    Ok(())
}

#[test]
fn premium_winter_profile_lands_on_baseline_and_submits() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(full_context(
        Terrain::Winter,
        Region::Co,
        BudgetBand::Premium,
        &["family", "winter"],
    ));
    let session_id = view.session.id.clone();

    require_eq!(view.journey_state.step, JourneyStep::Baseline);
    require_eq!(view.session.chosen_van_id.0, "aether-glider");
    require_eq!(view.session.total_price, Decimal::from(79_000));
    require_eq!(view.required_inputs, strings(&["optionSelection"]));
    require!(view.journey_state.completed, "baseline step counts as completed context");
    require!(
        view.available_options
            .iter()
            .all(|option| !option.incompatible_tags.contains(&"winter".to_string())),
        "winter trips should not list winter-incompatible options"
    );

    let session = service
        .toggle_option(&session_id, &option("option-snow-traction"))
        .map_err(|err| format!("toggle failed: {err}"))?;
    require_eq!(session.total_price, Decimal::from(87_200));
    require_eq!(session.journey.step, JourneyStep::Review);
    assert_price_invariant(&service, &session_id)?;

    let result = service.submit_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(result.status, SessionStatus::Submitted);
    require!(result.issue.is_none(), "clean submission should not raise an issue");
    require!(result.conflicts.is_empty());
    require_eq!(service.kpis().submitted, 1);
    Ok(())
}

#[test]
fn missing_context_holds_step_one_with_ordered_inputs() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(GuidedSessionInput {
        terrain: Some(Terrain::City),
        ..GuidedSessionInput::default()
    });

    require_eq!(view.journey_state.step, JourneyStep::Context);
    require_eq!(
        view.required_inputs,
        strings(&["customerName", "tripStyle", "budgetBand", "region"])
    );
    require!(view.journey_state.quick_actions.is_empty(), "step one offers no quick actions");
    require_eq!(view.session.customer_name, "Guest");
    require_eq!(view.session.budget, BudgetBand::Balanced.ceiling());
    assert_price_invariant(&service, &view.session.id)
}

#[test]
fn default_preferences_move_step_two_to_baseline() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view =
        service.start_session(full_context(Terrain::City, Region::Co, BudgetBand::Balanced, &[]));
    let session_id = view.session.id.clone();
    require_eq!(view.journey_state.step, JourneyStep::Preferences);
    require_eq!(view.required_inputs, strings(&["moods"]));

    let view = service
        .advance_session(
            &session_id,
            GuidedSessionUpdate {
                action: Some(GuidedAction::UseDefaultPreferences),
                ..GuidedSessionUpdate::default()
            },
        )
        .map_err(|err| err.to_string())?;

    require_eq!(view.journey_state.step, JourneyStep::Baseline);
    require_eq!(view.session.moods, strings(&["family", "safety"]));
    Ok(())
}

#[test]
fn submit_before_review_is_rejected_without_validation() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(full_context(
        Terrain::City,
        Region::Co,
        BudgetBand::Balanced,
        &["family"],
    ));
    let session_id = view.session.id.clone();
    require_eq!(view.journey_state.step, JourneyStep::Baseline);

    match service.submit_session(&session_id) {
        Err(DomainError::SubmissionRejected { step }) => require_eq!(step, JourneyStep::Baseline),
        other => return Err(format!("expected a rejected submission, got {other:?}")),
    }

    let view = service
        .advance_session(
            &session_id,
            GuidedSessionUpdate {
                action: Some(GuidedAction::Submit),
                ..GuidedSessionUpdate::default()
            },
        )
        .map_err(|err| err.to_string())?;
    require_eq!(
        view.submission_error.as_deref(),
        Some("Please complete the guided flow before submitting.")
    );
    require!(view.submission.is_none());
    require_eq!(view.session.status, SessionStatus::Draft);
    require!(
        view.session.logs.iter().any(|log| log.event == "submission_rejected"),
        "rejection should be logged on the session"
    );
    require_eq!(service.issue_list().len(), 0);
    Ok(())
}

#[test]
fn skip_to_submit_then_submit_in_one_flow() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(full_context(
        Terrain::City,
        Region::Co,
        BudgetBand::Balanced,
        &["family"],
    ));
    let session_id = view.session.id.clone();

    let view = service
        .advance_session(
            &session_id,
            GuidedSessionUpdate {
                action: Some(GuidedAction::SkipToSubmit),
                ..GuidedSessionUpdate::default()
            },
        )
        .map_err(|err| err.to_string())?;
    require_eq!(view.journey_state.step, JourneyStep::Review);

    // review persists without a selection, so the next call may submit
    let view = service
        .advance_session(
            &session_id,
            GuidedSessionUpdate {
                action: Some(GuidedAction::Submit),
                ..GuidedSessionUpdate::default()
            },
        )
        .map_err(|err| err.to_string())?;
    let submission = view.submission.ok_or_else(|| "submission should have run".to_string())?;
    require_eq!(submission.status, SessionStatus::Submitted);
    Ok(())
}

#[test]
fn double_toggle_restores_baseline_price() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(full_context(
        Terrain::City,
        Region::Co,
        BudgetBand::Balanced,
        &["family"],
    ));
    let session_id = view.session.id.clone();
    let baseline = view.session.total_price;

    service.toggle_option(&session_id, &option("option-quiet-cab")).map_err(|err| err.to_string())?;
    assert_price_invariant(&service, &session_id)?;
    let session = service
        .toggle_option(&session_id, &option("option-quiet-cab"))
        .map_err(|err| err.to_string())?;

    require!(session.selected_option_ids.is_empty());
    require_eq!(session.total_price, baseline);

    match service.toggle_option(&session_id, &option("option-hovercraft")) {
        Err(DomainError::OptionNotFound(id)) => require_eq!(id.0, "option-hovercraft"),
        other => return Err(format!("unknown option should be rejected, got {other:?}")),
    }
    Ok(())
}

#[test]
fn blocked_submission_reuses_open_issue_and_fix_applies_once() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let session_id = blocked_water_session(&mut service)?;

    let first = service.submit_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(first.status, SessionStatus::Blocked);
    require!(!first.conflicts.is_empty(), "blocked submission should carry conflicts");
    let issue = first.issue.ok_or_else(|| "blocked submission should raise an issue".to_string())?;
    require_eq!(issue.issue_type, IssueType::CompatibilityError);

    let second = service.submit_session(&session_id).map_err(|err| err.to_string())?;
    let repeated =
        second.issue.ok_or_else(|| "repeat submission should return the issue".to_string())?;
    require_eq!(repeated.id, issue.id);
    require_eq!(service.issues_for_session(&session_id).len(), 1);

    let fixed = service.apply_fix(&issue.id).map_err(|err| err.to_string())?;
    require!(fixed.fixed);
    let session = service.get_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(session.status, SessionStatus::Resolved);
    require!(session.selected_option_ids.is_empty(), "water-incompatible option should be removed");
    assert_price_invariant(&service, &session_id)?;

    match service.apply_fix(&issue.id) {
        Err(DomainError::FixNotApplicable(id)) => require_eq!(id, issue.id),
        other => return Err(format!("second fix should not apply, got {other:?}")),
    }
    require_eq!(service.kpis().resolved, 1);
    Ok(())
}

#[test]
fn over_budget_submission_needs_attention() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(GuidedSessionInput {
        budget: Some(Decimal::from(80_000)),
        ..full_context(Terrain::City, Region::Co, BudgetBand::Value, &["family"])
    });
    let session_id = view.session.id.clone();
    require_eq!(view.session.budget, Decimal::from(80_000));
    require_eq!(view.session.chosen_van_id.0, "aether-glider");

    service
        .advance_session(
            &session_id,
            GuidedSessionUpdate {
                option_ids: Some(vec![
                    option("option-solar-canopy"),
                    option("option-family-safety"),
                ]),
                ..GuidedSessionUpdate::default()
            },
        )
        .map_err(|err| err.to_string())?;

    let result = service.submit_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(result.status, SessionStatus::NeedsAttention);
    let issue = result.issue.ok_or_else(|| "budget issue expected".to_string())?;
    require_eq!(issue.issue_type, IssueType::BudgetPressure);
    require_eq!(issue.description, "Current configuration is $86,300 for a budget of $80,000.");

    service.apply_fix(&issue.id).map_err(|err| err.to_string())?;
    let session = service.get_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(session.selected_option_ids, vec![option("option-solar-canopy")]);
    require_eq!(session.status, SessionStatus::Resolved);
    Ok(())
}

#[test]
fn start_over_resets_journey_and_closes_issues() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let session_id = blocked_water_session(&mut service)?;
    service.submit_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(service.ops_board(Some(session_id.clone())).fix_candidates.len(), 1);

    let view = service
        .advance_session(
            &session_id,
            GuidedSessionUpdate {
                action: Some(GuidedAction::StartOver),
                ..GuidedSessionUpdate::default()
            },
        )
        .map_err(|err| err.to_string())?;

    require_eq!(view.journey_state.step, JourneyStep::Context);
    require!(view.session.selected_option_ids.is_empty());
    require!(view.session.trip_style.is_none());
    require_eq!(view.session.status, SessionStatus::Draft);
    require_eq!(view.required_inputs.len(), 5);
    require!(service.issues_for_session(&session_id).iter().all(|issue| issue.fixed));
    require!(service.ops_board(Some(session_id)).fix_candidates.is_empty());
    Ok(())
}

#[test]
fn ops_board_ranks_blocked_compatibility_first() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let blocked = blocked_water_session(&mut service)?;
    service.submit_session(&blocked).map_err(|err| err.to_string())?;

    let board = service.ops_board(None);
    let top = board.priority_queue.first().ok_or_else(|| "queue should not be empty".to_string())?;
    require_eq!(top.source_type, OpsSourceType::IssueFix);
    require_eq!(top.priority, PriorityLane::P0);
    require_eq!(top.session_id.as_ref(), Some(&blocked));
    require_eq!(board.priority_queue.len(), 4);
    require_eq!(board.immediate_fixes.len(), 1);
    require_eq!(board.action_recommendations.len(), board.priority_queue.len());
    for pair in board.priority_queue.windows(2) {
        require!(pair[0].score >= pair[1].score, "queue must be sorted by score");
    }

    let other = service.ops_board(Some(SessionId("somebody-else".to_string())));
    require!(other.fix_candidates.is_empty());
    require_eq!(other.feature_build_candidates.len(), 3);
    Ok(())
}

#[test]
fn unknown_sessions_and_reset() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let missing = SessionId("missing".to_string());

    require!(matches!(service.refresh_session(&missing), Err(DomainError::SessionNotFound(_))));
    require!(matches!(service.submit_session(&missing), Err(DomainError::SessionNotFound(_))));
    require!(service.issues_for_session(&missing).is_empty());

    blocked_water_session(&mut service)?;
    let summary = service.seed_state_summary();
    require_eq!(summary.van_count, 6);
    require_eq!(summary.option_count, 8);
    require_eq!(summary.active_sessions, 1);

    require_eq!(service.reset_all().status, "reset");
    require_eq!(service.kpis().total_sessions, 0);
    require_eq!(service.seed_state_summary().active_issues, 0);
    Ok(())
}

#[test]
fn baseline_budget_card_quotes_the_recommendation_estimate() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let session_id = winter_session(&mut service);
    let view = service.refresh_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(view.journey_state.step, JourneyStep::Baseline);

    let card = view
        .journey_state
        .step_cards
        .iter()
        .find(|card| card.id == "step-3-total")
        .ok_or_else(|| "baseline step should carry a budget readout".to_string())?;
    require_eq!(
        card.body,
        format!("Live baseline: {}", format_money(view.recommendation.estimated_price))
    );
    require_eq!(card.chip_hints, strings(&["In budget"]));
    Ok(())
}

#[test]
fn deselecting_the_last_option_returns_to_options() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let session_id = winter_session(&mut service);

    let session = service
        .toggle_option(&session_id, &option("option-snow-traction"))
        .map_err(|err| err.to_string())?;
    require_eq!(session.journey.step, JourneyStep::Review);

    let session = service
        .toggle_option(&session_id, &option("option-snow-traction"))
        .map_err(|err| err.to_string())?;
    require!(session.selected_option_ids.is_empty());
    require_eq!(session.journey.step, JourneyStep::Options);
    require_eq!(session.total_price, Decimal::from(79_000));

    let view = service.refresh_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(view.journey_state.step, JourneyStep::Options);
    require_eq!(view.required_inputs, strings(&["optionSelection"]));
    Ok(())
}

#[test]
fn option_id_on_advance_toggles_the_selection() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let session_id = winter_session(&mut service);
    let toggle = || GuidedSessionUpdate {
        option_id: Some(option("option-snow-traction")),
        ..GuidedSessionUpdate::default()
    };

    let view = service.advance_session(&session_id, toggle()).map_err(|err| err.to_string())?;
    require_eq!(view.session.selected_option_ids, vec![option("option-snow-traction")]);
    require_eq!(view.session.total_price, Decimal::from(87_200));
    require_eq!(view.journey_state.step, JourneyStep::Review);

    let view = service.advance_session(&session_id, toggle()).map_err(|err| err.to_string())?;
    require!(view.session.selected_option_ids.is_empty());
    require_eq!(view.session.total_price, Decimal::from(79_000));
    require_eq!(view.journey_state.step, JourneyStep::Options);
    assert_price_invariant(&service, &session_id)
}

#[test]
fn default_preferences_keep_a_selected_build_in_review() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(full_context(
        Terrain::City,
        Region::Co,
        BudgetBand::Balanced,
        &["family"],
    ));
    let session_id = view.session.id.clone();
    service.toggle_option(&session_id, &option("option-quiet-cab")).map_err(|err| err.to_string())?;

    let view = run_action(&mut service, &session_id, GuidedAction::UseDefaultPreferences)?;
    require_eq!(view.session.moods, strings(&["family", "safety"]));
    require_eq!(view.journey_state.step, JourneyStep::Review);

    let view = service.refresh_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(view.journey_state.step, JourneyStep::Review);
    Ok(())
}

#[test]
fn show_options_moves_baseline_to_options() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let session_id = winter_session(&mut service);

    let view = run_action(&mut service, &session_id, GuidedAction::ShowOptions)?;
    require_eq!(view.journey_state.step, JourneyStep::Options);
    let actions: Vec<&str> =
        view.journey_state.quick_actions.iter().map(|action| action.value.as_str()).collect();
    require_eq!(
        actions,
        vec!["optimize_family", "optimize_safety", "optimize_budget", "skip_to_submit"]
    );

    let view = service.refresh_session(&session_id).map_err(|err| err.to_string())?;
    require_eq!(view.journey_state.step, JourneyStep::Options);
    Ok(())
}

#[test]
fn optimize_moods_are_added_once() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(full_context(
        Terrain::City,
        Region::Co,
        BudgetBand::Balanced,
        &["family"],
    ));
    let session_id = view.session.id.clone();
    run_action(&mut service, &session_id, GuidedAction::ShowOptions)?;

    let view = run_action(&mut service, &session_id, GuidedAction::OptimizeFamily)?;
    require_eq!(view.session.moods, strings(&["family"]));
    let view = run_action(&mut service, &session_id, GuidedAction::OptimizeSafety)?;
    require_eq!(view.session.moods, strings(&["family", "safety"]));
    let view = run_action(&mut service, &session_id, GuidedAction::OptimizeSafety)?;
    require_eq!(view.session.moods, strings(&["family", "safety"]));
    require_eq!(view.journey_state.step, JourneyStep::Options);

    let optimizations =
        view.session.logs.iter().filter(|log| log.event == "guidance_action").count();
    require_eq!(optimizations, 1);
    assert_price_invariant(&service, &session_id)
}

#[test]
fn optimize_budget_lowers_budget_and_clears_options() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(GuidedSessionInput {
        budget: Some(Decimal::from(5_000)),
        ..full_context(Terrain::Winter, Region::Co, BudgetBand::Premium, &["family", "winter"])
    });
    let session_id = view.session.id.clone();
    require_eq!(view.session.budget, Decimal::from(5_000));
    // nothing fits the budget, so the first catalog van stands in
    require_eq!(view.session.chosen_van_id.0, "aether-glider");

    service
        .toggle_option(&session_id, &option("option-snow-traction"))
        .map_err(|err| err.to_string())?;

    let view = run_action(&mut service, &session_id, GuidedAction::OptimizeBudget)?;
    require_eq!(view.session.budget, Decimal::ZERO);
    require!(view.session.selected_option_ids.is_empty());
    require_eq!(view.session.chosen_van_id.0, "aether-glider");
    require_eq!(view.session.total_price, Decimal::from(79_000));
    require_eq!(view.journey_state.step, JourneyStep::Options);

    let view = run_action(&mut service, &session_id, GuidedAction::OptimizeBudget)?;
    require_eq!(view.session.budget, Decimal::ZERO);
    assert_price_invariant(&service, &session_id)
}

#[test]
fn safe_baseline_clears_options_and_allows_submit() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let session_id = winter_session(&mut service);
    service
        .toggle_option(&session_id, &option("option-snow-traction"))
        .map_err(|err| err.to_string())?;

    let view = run_action(&mut service, &session_id, GuidedAction::SafeBaseline)?;
    require!(view.session.selected_option_ids.is_empty());
    require_eq!(view.session.total_price, Decimal::from(79_000));
    require_eq!(view.journey_state.step, JourneyStep::Review);

    let view = run_action(&mut service, &session_id, GuidedAction::Submit)?;
    require!(view.submission_error.is_none());
    let submission = view.submission.ok_or_else(|| "submission should have run".to_string())?;
    require_eq!(submission.status, SessionStatus::Submitted);
    Ok(())
}

#[test]
fn zero_budget_is_not_captured() -> GuidedFlowTestResult {
    let mut service = GuidedSessionService::default();
    let view = service.start_session(GuidedSessionInput {
        budget: Some(Decimal::ZERO),
        budget_band: None,
        ..full_context(Terrain::City, Region::Co, BudgetBand::Balanced, &["family"])
    });
    let session_id = view.session.id.clone();
    require_eq!(view.journey_state.step, JourneyStep::Context);
    require_eq!(view.required_inputs, strings(&["budgetBand"]));
    require_eq!(view.session.budget, BudgetBand::Balanced.ceiling());

    let zero =
        GuidedSessionUpdate { budget: Some(Decimal::ZERO), ..GuidedSessionUpdate::default() };
    let view = service.advance_session(&session_id, zero).map_err(|err| err.to_string())?;
    require_eq!(view.required_inputs, strings(&["budgetBand"]));

    let real = GuidedSessionUpdate {
        budget: Some(Decimal::from(90_000)),
        ..GuidedSessionUpdate::default()
    };
    let view = service.advance_session(&session_id, real).map_err(|err| err.to_string())?;
    require_eq!(view.session.budget, Decimal::from(90_000));
    require_eq!(view.journey_state.step, JourneyStep::Baseline);
    Ok(())
}
