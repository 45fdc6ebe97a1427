use crate::cpq::pricing::format_money;
use crate::cpq::Recommendation;
use crate::domain::journey::{BadgeTone, JourneyCard, JourneyStep, QuickAction};
use crate::domain::session::{InputField, Session};
use crate::domain::vehicle::VanModel;

fn card(
    id: &str,
    title: &str,
    body: String,
    badge: BadgeTone,
    chip_hints: Vec<String>,
) -> JourneyCard {
    JourneyCard {
        id: id.to_string(),
        title: title.to_string(),
        body,
        badge: Some(badge),
        chip_hints,
    }
}

fn chips(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn budget_tone(session: &Session) -> BadgeTone {
    if session.total_price > session.budget {
        BadgeTone::Warning
    } else {
        BadgeTone::Success
    }
}

pub fn next_question(step: JourneyStep, missing: &[InputField]) -> String {
    match step {
        JourneyStep::Context => {
            let fields = if missing.is_empty() {
                "context".to_string()
            } else {
                missing.iter().map(InputField::as_str).collect::<Vec<_>>().join(", ")
            };
            format!("I need a couple details before we lock the fit: {fields}.")
        }
        JourneyStep::Preferences => {
            "Pick your top preference: family, adventure, safety, luxury, or winter/water focus."
                .to_string()
        }
        JourneyStep::Baseline => {
            "Baseline is ready. Tap to confirm and go to upgrade options.".to_string()
        }
        JourneyStep::Options => "Pick 3-4 upgrades, then submit for readiness check.".to_string(),
        JourneyStep::Review => {
            "You are at the final step. Ready to run the readiness check when you want to submit."
                .to_string()
        }
    }
}

pub fn quick_actions(step: JourneyStep) -> Vec<QuickAction> {
    match step {
        JourneyStep::Context => Vec::new(),
        JourneyStep::Preferences => vec![
            QuickAction::new("use-defaults", "Use safe defaults", "use_default_preferences"),
            QuickAction::new("mood-family", "Family", "family"),
            QuickAction::new("mood-adventure", "Adventure", "adventure"),
            QuickAction::new("mood-safety", "Safety", "safety"),
            QuickAction::new("mood-luxury", "Luxury", "luxury"),
        ],
        JourneyStep::Baseline => {
            vec![QuickAction::new("show-options", "Show upgrade options", "show_options")]
        }
        JourneyStep::Options => vec![
            QuickAction::new("opt-family", "Optimize for family", "optimize_family"),
            QuickAction::new("opt-safety", "Optimize for safety", "optimize_safety"),
            QuickAction::new("opt-budget", "Optimize for budget", "optimize_budget"),
            QuickAction::new("skip-options", "Skip upgrades", "skip_to_submit"),
        ],
        JourneyStep::Review => vec![
            QuickAction::new("safe-baseline", "Try safer baseline", "safe_baseline"),
            QuickAction::new("restart", "Start over", "start_over"),
            QuickAction::new("submit", "Submit for readiness check", "submit"),
        ],
    }
}

pub fn step_cards(
    step: JourneyStep,
    session: &Session,
    van: &VanModel,
    recommendation: &Recommendation,
) -> Vec<JourneyCard> {
    match step {
        JourneyStep::Context => {
            let summary = format!(
                "Budget: {} • Region: {} • Terrain: {} • Trip style: {}",
                format_money(session.budget),
                session.region,
                session.terrain,
                session
                    .trip_style
                    .as_deref()
                    .filter(|style| !style.is_empty())
                    .unwrap_or("general"),
            );
            vec![card(
                "step-1",
                "Step 1: Customer context",
                format!("Tell us your context in one pass. {summary}"),
                BadgeTone::Info,
                chips(&["Family", "Adventure", "Luxury", "Safety", "Water"]),
            )]
        }
        JourneyStep::Preferences => vec![card(
            "step-2",
            "Step 2: Preference capture",
            "Pick the vibe for this trip so we can tune fit fast.".to_string(),
            BadgeTone::Info,
            chips(&["family", "adventure", "safety", "luxury", "winter", "water"]),
        )],
        JourneyStep::Baseline => {
            let highlights = van.features.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
            let over_budget = session.total_price > session.budget;
            vec![
                card(
                    "step-3-baseline",
                    "Step 3: Baseline fit",
                    format!("{} selected. Why this is right: {highlights}", van.name),
                    BadgeTone::Success,
                    van.tags.clone(),
                ),
                card(
                    "step-3-total",
                    "Budget readout",
                    format!("Live baseline: {}", format_money(recommendation.estimated_price)),
                    budget_tone(session),
                    vec![if over_budget { "Budget risk" } else { "In budget" }.to_string()],
                ),
            ]
        }
        JourneyStep::Options => {
            let shortlist = recommendation.options.iter().take(4);
            let option_chips: Vec<String> = shortlist
                .clone()
                .map(|option| format!("{} (+{})", option.name, format_money(option.delta_price)))
                .collect();
            let body = if option_chips.is_empty() {
                "No compatible options yet for this profile.".to_string()
            } else {
                option_chips.join("  •  ")
            };
            vec![
                card(
                    "step-4-options",
                    "Step 4: Upgrade stack",
                    body,
                    BadgeTone::Warning,
                    shortlist.map(|option| option.name.clone()).collect(),
                ),
                card(
                    "step-4-savings",
                    "Live total",
                    format!(
                        "Total: {} / Budget: {}",
                        format_money(session.total_price),
                        format_money(session.budget)
                    ),
                    budget_tone(session),
                    Vec::new(),
                ),
            ]
        }
        JourneyStep::Review => vec![card(
            "step-5-ready",
            "Step 5: Readiness check",
            "Final check-in. Submit to validate compatibility and budget before handoff."
                .to_string(),
            budget_tone(session),
            Vec::new(),
        )],
    }
}
