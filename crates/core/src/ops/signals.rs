//! Curated feature-opportunity signals that always appear on the board

use crate::domain::ops::Level;

/// One roadmap idea with fixed assessment values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSignal {
    pub title: &'static str,
    pub rationale: &'static str,
    pub impact: Level,
    pub urgency: Level,
    pub risk: Level,
    pub confidence: f64,
    pub eta_business_days: u32,
}

pub const FEATURE_SIGNALS: [FeatureSignal; 3] = [
    FeatureSignal {
        title: "Add compatibility preflight check in Step 2",
        rationale: "Users currently discover a compatibility issue after baseline selection. \
                    A step-2 warning improves first-pass confidence.",
        impact: Level::High,
        urgency: Level::Medium,
        risk: Level::Low,
        confidence: 0.87,
        eta_business_days: 5,
    },
    FeatureSignal {
        title: "Introduce budget guardrails in option picker",
        rationale: "Option chips should disable or reorder options that exceed the live budget \
                    by default.",
        impact: Level::Medium,
        urgency: Level::Medium,
        risk: Level::Low,
        confidence: 0.82,
        eta_business_days: 4,
    },
    FeatureSignal {
        title: "Auto-generate one-click follow-up stories from repeated P0 defects",
        rationale: "Each blocked session should optionally create a prefilled operations backlog \
                    ticket for the dev coworker.",
        impact: Level::Medium,
        urgency: Level::Low,
        risk: Level::Medium,
        confidence: 0.74,
        eta_business_days: 8,
    },
];
