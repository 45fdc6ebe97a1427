use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::journey::JourneyStep;
use crate::domain::session::InputField;

/// Quick actions a caller can request alongside an advance; at most one per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum GuidedAction {
    StartOver,
    ShowOptions,
    SkipToSubmit,
    UseDefaultPreferences,
    SafeBaseline,
    OptimizeFamily,
    OptimizeSafety,
    OptimizeBudget,
    Submit,
}

impl GuidedAction {
    pub const ALL: [GuidedAction; 9] = [
        GuidedAction::StartOver,
        GuidedAction::ShowOptions,
        GuidedAction::SkipToSubmit,
        GuidedAction::UseDefaultPreferences,
        GuidedAction::SafeBaseline,
        GuidedAction::OptimizeFamily,
        GuidedAction::OptimizeSafety,
        GuidedAction::OptimizeBudget,
        GuidedAction::Submit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartOver => "start_over",
            Self::ShowOptions => "show_options",
            Self::SkipToSubmit => "skip_to_submit",
            Self::UseDefaultPreferences => "use_default_preferences",
            Self::SafeBaseline => "safe_baseline",
            Self::OptimizeFamily => "optimize_family",
            Self::OptimizeSafety => "optimize_safety",
            Self::OptimizeBudget => "optimize_budget",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for GuidedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuidedAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| format!("unknown guided action `{value}`"))
    }
}

/// Session facts the step resolver reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowContext {
    pub missing_inputs: Vec<InputField>,
    pub has_moods: bool,
    pub has_selection: bool,
    pub previous_step: JourneyStep,
    /// Step explicitly requested by a quick action in the current call.
    pub directive: Option<JourneyStep>,
}

/// What a quick action did besides mutating session fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub directive: Option<JourneyStep>,
    /// Open issues owned by the session must be closed.
    pub closes_open_issues: bool,
}

impl ActionOutcome {
    pub fn directed(step: JourneyStep) -> Self {
        Self { directive: Some(step), closes_open_issues: false }
    }
}
