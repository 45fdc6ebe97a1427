use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::journey::GuidedJourneyState;
use crate::domain::vehicle::{OptionId, Region, Terrain, VanId};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Leading characters of the id, used where a compact reference is enough.
    pub fn short(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((index, _)) => &self.0[..index],
            None => &self.0,
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Draft,
    NeedsAttention,
    Submitted,
    Blocked,
    Resolved,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::NeedsAttention => "needs_attention",
            Self::Submitted => "submitted",
            Self::Blocked => "blocked",
            Self::Resolved => "resolved",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSeverity {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLog {
    pub ts: DateTime<Utc>,
    pub event: String,
    pub message: String,
    pub severity: LogSeverity,
}

impl SessionLog {
    pub fn new(
        event: impl Into<String>,
        message: impl Into<String>,
        severity: LogSeverity,
    ) -> Self {
        Self { ts: Utc::now(), event: event.into(), message: message.into(), severity }
    }

    pub fn info(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(event, message, LogSeverity::Info)
    }

    pub fn warn(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(event, message, LogSeverity::Warn)
    }

    pub fn error(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(event, message, LogSeverity::Error)
    }
}

/// Context fields the first journey step must collect, in prompt order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputField {
    CustomerName,
    TripStyle,
    BudgetBand,
    Terrain,
    Region,
}

impl InputField {
    pub const ORDER: [InputField; 5] = [
        InputField::CustomerName,
        InputField::TripStyle,
        InputField::BudgetBand,
        InputField::Terrain,
        InputField::Region,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerName => "customerName",
            Self::TripStyle => "tripStyle",
            Self::BudgetBand => "budgetBand",
            Self::Terrain => "terrain",
            Self::Region => "region",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedInputs {
    pub customer_name: bool,
    pub trip_style: bool,
    pub budget_band: bool,
    pub terrain: bool,
    pub region: bool,
}

impl CapturedInputs {
    pub fn all() -> Self {
        Self {
            customer_name: true,
            trip_style: true,
            budget_band: true,
            terrain: true,
            region: true,
        }
    }

    pub fn none() -> Self {
        Self {
            customer_name: false,
            trip_style: false,
            budget_band: false,
            terrain: false,
            region: false,
        }
    }

    pub fn is_captured(&self, field: InputField) -> bool {
        match field {
            InputField::CustomerName => self.customer_name,
            InputField::TripStyle => self.trip_style,
            InputField::BudgetBand => self.budget_band,
            InputField::Terrain => self.terrain,
            InputField::Region => self.region,
        }
    }

    pub fn missing(&self) -> Vec<InputField> {
        InputField::ORDER.into_iter().filter(|field| !self.is_captured(*field)).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

impl Default for CapturedInputs {
    fn default() -> Self {
        Self::all()
    }
}

/// The mutable unit of work for one customer's guided configuration.
///
/// `chosen_van_id`, `total_price` and `journey` are projections; they are rewritten
/// by the guided session service after every mutation and never patched in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub customer_name: String,
    pub budget: Decimal,
    pub occupancy: u32,
    pub terrain: Terrain,
    pub region: Region,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_style: Option<String>,
    pub moods: Vec<String>,
    pub chosen_van_id: VanId,
    pub selected_option_ids: Vec<OptionId>,
    pub total_price: Decimal,
    pub status: SessionStatus,
    pub journey: GuidedJourneyState,
    pub captured_inputs: CapturedInputs,
    pub logs: Vec<SessionLog>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn record(&mut self, entry: SessionLog) {
        self.logs.push(entry);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn has_mood(&self, mood: &str) -> bool {
        self.moods.iter().any(|candidate| candidate == mood)
    }

    /// Appends a mood if absent; returns whether the set changed.
    pub fn add_mood(&mut self, mood: &str) -> bool {
        if self.has_mood(mood) {
            return false;
        }
        self.moods.push(mood.to_string());
        true
    }

    pub fn is_selected(&self, option_id: &OptionId) -> bool {
        self.selected_option_ids.contains(option_id)
    }

    /// Flips membership of one option; returns `true` when the option is now selected.
    pub fn toggle_option(&mut self, option_id: &OptionId) -> bool {
        if self.is_selected(option_id) {
            self.selected_option_ids.retain(|selected| selected != option_id);
            false
        } else {
            self.selected_option_ids.push(option_id.clone());
            true
        }
    }

    /// Replaces the whole selection, keeping first occurrences only.
    pub fn replace_options(&mut self, option_ids: Vec<OptionId>) {
        let mut seen = BTreeSet::new();
        self.selected_option_ids =
            option_ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
    }
}

/// Trims, lowercases and de-duplicates free-text mood tags, dropping blanks.
pub fn normalize_moods<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .iter()
        .map(|value| value.as_ref().trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
