use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five ordered stages of the guided configuration flow.
///
/// Serialized as its ordinal (`1..=5`) so clients can compare steps numerically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum JourneyStep {
    Context,
    Preferences,
    Baseline,
    Options,
    Review,
}

impl JourneyStep {
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Context => 1,
            Self::Preferences => 2,
            Self::Baseline => 3,
            Self::Options => 4,
            Self::Review => 5,
        }
    }
}

impl From<JourneyStep> for u8 {
    fn from(step: JourneyStep) -> Self {
        step.ordinal()
    }
}

impl TryFrom<u8> for JourneyStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Context),
            2 => Ok(Self::Preferences),
            3 => Ok(Self::Baseline),
            4 => Ok(Self::Options),
            5 => Ok(Self::Review),
            other => Err(format!("journey step must be in 1..=5, got {other}")),
        }
    }
}

impl fmt::Display for JourneyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ordinal())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Info,
    Warning,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyCard {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<BadgeTone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chip_hints: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAction {
    pub id: String,
    pub label: String,
    pub value: String,
}

impl QuickAction {
    pub fn new(id: &str, label: &str, value: &str) -> Self {
        Self { id: id.to_string(), label: label.to_string(), value: value.to_string() }
    }
}

/// Presentation view of a session, rebuilt from scratch after every mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidedJourneyState {
    pub step: JourneyStep,
    pub next_question: String,
    pub required_inputs: Vec<String>,
    pub step_cards: Vec<JourneyCard>,
    pub quick_actions: Vec<QuickAction>,
    pub completed: bool,
}

impl Default for GuidedJourneyState {
    fn default() -> Self {
        Self {
            step: JourneyStep::Context,
            next_question: String::new(),
            required_inputs: Vec::new(),
            step_cards: Vec::new(),
            quick_actions: Vec::new(),
            completed: false,
        }
    }
}
