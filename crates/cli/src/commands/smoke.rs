use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use vanguide_agent::SupportSummarizer;
use vanguide_core::config::{AppConfig, LoadOptions};
use vanguide_core::domain::vehicle::{BudgetBand, Region, Terrain};
use vanguide_core::summary::{submission_summary_text, Summarizer};
use vanguide_core::{
    GuidedSessionInput, GuidedSessionService, JourneyStep, OptionId, SessionId, SessionStatus,
    SubmissionResult,
};

use crate::commands::CommandResult;

const FLOW_CHECKS: [&str; 7] = [
    "config_validation",
    "guided_session_start",
    "option_toggle",
    "submission",
    "compatibility_fix",
    "ops_board",
    "support_summary",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

struct SmokeRun {
    started: Instant,
    checks: Vec<SmokeCheck>,
}

impl SmokeRun {
    fn new() -> Self {
        Self { started: Instant::now(), checks: Vec::new() }
    }

    /// Records one timed check; `None` means it failed and the run should stop.
    fn step<T>(
        &mut self,
        name: &'static str,
        check: impl FnOnce() -> Result<(T, String), String>,
    ) -> Option<T> {
        match timed_check(check) {
            Ok((elapsed_ms, (value, message))) => {
                self.checks.push(SmokeCheck {
                    name,
                    status: SmokeStatus::Pass,
                    elapsed_ms,
                    message,
                });
                Some(value)
            }
            Err((elapsed_ms, message)) => {
                self.checks.push(SmokeCheck {
                    name,
                    status: SmokeStatus::Fail,
                    elapsed_ms,
                    message,
                });
                None
            }
        }
    }

    fn finish(mut self) -> CommandResult {
        let ran = self.checks.len();
        self.checks.extend(FLOW_CHECKS.iter().copied().skip(ran).map(skipped));
        finalize_report(self.checks, self.started.elapsed().as_millis() as u64)
    }
}

pub fn run() -> CommandResult {
    let mut smoke = SmokeRun::new();

    let Some(config) = smoke.step("config_validation", || {
        AppConfig::load(LoadOptions::default())
            .map(|config| (config, "configuration loaded and validated".to_string()))
            .map_err(|error| error.to_string())
    }) else {
        return smoke.finish();
    };

    let mut service = GuidedSessionService::default();

    let Some(session_id) = smoke.step("guided_session_start", || {
        let view = service.start_session(winter_profile());
        if view.journey_state.step != JourneyStep::Baseline {
            return Err(format!(
                "expected baseline step, journey is at {:?}",
                view.journey_state.step
            ));
        }
        let message = format!(
            "session {} recommends {} at {}",
            view.session.id, view.session.chosen_van_id, view.session.total_price
        );
        Ok((view.session.id, message))
    }) else {
        return smoke.finish();
    };

    let toggled = smoke.step("option_toggle", || {
        let session = service
            .toggle_option(&session_id, &option("option-snow-traction"))
            .map_err(|error| error.to_string())?;
        let catalog = service.catalog();
        let base = catalog
            .van_by_id(&session.chosen_van_id)
            .map(|van| van.base_price)
            .ok_or_else(|| format!("chosen van `{}` missing from catalog", session.chosen_van_id))?;
        let expected = base
            + catalog
                .resolve_options(&session.selected_option_ids)
                .iter()
                .map(|option| option.delta_price)
                .sum::<Decimal>();
        if session.total_price != expected {
            return Err(format!(
                "total {} does not match priced selection {expected}",
                session.total_price
            ));
        }
        if session.journey.step != JourneyStep::Review {
            return Err(format!("expected review step, journey is at {:?}", session.journey.step));
        }
        Ok(((), format!("total price {} after toggle", session.total_price)))
    });
    if toggled.is_none() {
        return smoke.finish();
    }

    let Some(submission) = smoke.step("submission", || {
        let result = service.submit_session(&session_id).map_err(|error| error.to_string())?;
        if result.status != SessionStatus::Submitted {
            return Err(format!("expected submitted, got {}", result.status.as_str()));
        }
        Ok((result, "clean configuration submitted".to_string()))
    }) else {
        return smoke.finish();
    };

    let fixed = smoke.step("compatibility_fix", || blocked_submission_fix(&mut service));
    if fixed.is_none() {
        return smoke.finish();
    }

    let board = smoke.step("ops_board", || {
        let board = service.ops_board(None);
        if board.priority_queue.is_empty() {
            return Err("priority queue is empty".to_string());
        }
        if board.priority_queue.windows(2).any(|pair| pair[0].score < pair[1].score) {
            return Err("priority queue is not ordered by score".to_string());
        }
        if board.action_recommendations.len() != board.priority_queue.len() {
            return Err("every queue item needs an action recommendation".to_string());
        }
        Ok(((), format!("{} queue items ranked", board.priority_queue.len())))
    });
    if board.is_none() {
        return smoke.finish();
    }

    smoke.step("support_summary", || support_summary(&config, &submission));
    smoke.finish()
}

fn winter_profile() -> GuidedSessionInput {
    GuidedSessionInput {
        customer_name: Some("Smoke Test".to_string()),
        budget_band: Some(BudgetBand::Premium),
        terrain: Some(Terrain::Winter),
        region: Some(Region::Co),
        trip_style: Some("weekend".to_string()),
        moods: Some(vec!["family".to_string(), "winter".to_string()]),
        ..GuidedSessionInput::default()
    }
}

fn option(id: &str) -> OptionId {
    OptionId(id.to_string())
}

/// Water trip with a track-only upgrade must block, then resolve through its fix.
fn blocked_submission_fix(
    service: &mut GuidedSessionService,
) -> Result<(SessionId, String), String> {
    let view = service.start_session(GuidedSessionInput {
        terrain: Some(Terrain::Water),
        region: Some(Region::Ca),
        budget_band: Some(BudgetBand::Luxury),
        moods: Some(vec!["water".to_string()]),
        ..winter_profile()
    });
    let session_id = view.session.id;
    service
        .toggle_option(&session_id, &option("option-snow-traction"))
        .map_err(|error| error.to_string())?;

    let result = service.submit_session(&session_id).map_err(|error| error.to_string())?;
    let issue = match (result.status, result.issue) {
        (SessionStatus::Blocked, Some(issue)) => issue,
        (status, _) => return Err(format!("expected blocked with issue, got {}", status.as_str())),
    };

    let fixed = service.apply_fix(&issue.id).map_err(|error| error.to_string())?;
    let status = service.get_session(&session_id).map_err(|error| error.to_string())?.status;
    if !fixed.fixed || status != SessionStatus::Resolved {
        return Err(format!("fix left session {}", status.as_str()));
    }
    Ok((session_id, format!("issue {} fixed, session resolved", issue.id)))
}

fn support_summary(
    config: &AppConfig,
    submission: &SubmissionResult,
) -> Result<((), String), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| format!("failed to initialize async runtime: {error}"))?;

    // always the deterministic path, a smoke run must not leave the process
    let summarizer = SupportSummarizer::fallback_only();
    let text = submission_summary_text(submission);
    let summary = runtime.block_on(summarizer.summarize(&submission.session.id, &text));
    if !summary.starts_with("[fallback:") {
        return Err(format!("unexpected summary shape: {summary}"));
    }

    let mode = if config.summarizer.model_enabled() { "model" } else { "fallback" };
    Ok(((), format!("fallback summary produced (configured mode: {mode})")))
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((started.elapsed().as_millis() as u64, value)),
        Err(error) => Err((started.elapsed().as_millis() as u64, error)),
    }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}
