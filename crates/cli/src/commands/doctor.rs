use serde::Serialize;
use vanguide_agent::SupportSummarizer;
use vanguide_core::config::{AppConfig, LoadOptions};
use vanguide_core::cpq::constraints::satisfies_tag;
use vanguide_core::Catalog;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_summarizer(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "summarizer_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }
    checks.push(check_catalog(&Catalog::seeded()));

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// Fails only when a key is configured but no client could be built from it.
fn check_summarizer(config: &AppConfig) -> DoctorCheck {
    let summarizer = SupportSummarizer::from_config(&config.summarizer);
    let wants_model = config.summarizer.model_enabled();

    let (status, details) = match (wants_model, summarizer.is_model_backed()) {
        (true, true) => (
            CheckStatus::Pass,
            format!(
                "model-backed summaries via `{}` at {}",
                config.summarizer.model, config.summarizer.base_url
            ),
        ),
        (true, false) => (
            CheckStatus::Fail,
            "api key configured but the summarizer client could not be built".to_string(),
        ),
        (false, _) => (
            CheckStatus::Pass,
            "deterministic fallback summaries (no api key or fallback mode)".to_string(),
        ),
    };

    DoctorCheck { name: "summarizer_readiness", status, details }
}

fn check_catalog(catalog: &Catalog) -> DoctorCheck {
    match catalog_problems(catalog) {
        Ok(()) => DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Pass,
            details: format!(
                "{} vans and {} options with unique ids and satisfiable requirements",
                catalog.vans().len(),
                catalog.options().len()
            ),
        },
        Err(problems) => DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Fail,
            details: problems.join("; "),
        },
    }
}

fn catalog_problems(catalog: &Catalog) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    if let Err(error) = Catalog::new(catalog.vans().to_vec(), catalog.options().to_vec()) {
        problems.push(error.to_string());
    }

    for option in catalog.options() {
        let satisfiable = catalog.vans().iter().any(|van| {
            option.required_tags.iter().all(|tag| satisfies_tag(van, tag))
        });
        if !satisfiable {
            problems.push(format!(
                "option `{}` requires [{}] which no van provides",
                option.id.0,
                option.required_tags.join(", ")
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
