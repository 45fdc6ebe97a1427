use serde::{Deserialize, Serialize};

use crate::domain::vehicle::{OptionId, OptionItem, Terrain, VanModel};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub code: String,
    pub option_id: OptionId,
    pub message: String,
    pub missing_tags: Vec<String>,
    pub suggestion: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ConstraintInput<'a> {
    pub van: &'a VanModel,
    pub terrain: Terrain,
    pub selected: Vec<&'a OptionItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub valid: bool,
    pub violations: Vec<ConstraintViolation>,
}

impl Default for ConstraintResult {
    fn default() -> Self {
        Self { valid: true, violations: Vec::new() }
    }
}

pub trait ConstraintEngine: Send + Sync {
    fn validate(&self, input: &ConstraintInput<'_>) -> ConstraintResult;
}

#[derive(Default)]
pub struct DeterministicConstraintEngine;

impl ConstraintEngine for DeterministicConstraintEngine {
    fn validate(&self, input: &ConstraintInput<'_>) -> ConstraintResult {
        validate_configuration(input)
    }
}

/// Lenient pre-filter used while listing options.
///
/// Only winter and water terrains block on incompatibility here; the stricter per-terrain
/// check runs at submission time in [`validate_configuration`].
pub fn is_compatible(van_tags: &[String], option: &OptionItem, terrain: Terrain) -> bool {
    let has_required = option.required_tags.iter().all(|tag| van_tags.contains(tag));
    if !has_required {
        return false;
    }

    match terrain {
        Terrain::Winter | Terrain::Water => !option.is_incompatible_with(terrain.as_str()),
        _ => true,
    }
}

/// Whether `van` covers a required option tag.
pub fn satisfies_tag(van: &VanModel, tag: &str) -> bool {
    // tracked vans count as offroad capable
    van.has_tag(tag) || (tag == "offroad" && van.has_tag("tracks"))
}

/// Submission-time conflict scan over the selected options.
pub fn validate_configuration(input: &ConstraintInput<'_>) -> ConstraintResult {
    let mut result = ConstraintResult::default();

    for option in &input.selected {
        let missing_tags: Vec<String> = option
            .required_tags
            .iter()
            .filter(|tag| !satisfies_tag(input.van, tag))
            .cloned()
            .collect();
        let terrain_blocked = option.is_incompatible_with(input.terrain.as_str());

        if missing_tags.is_empty() && !terrain_blocked {
            continue;
        }

        let (code, suggestion) = if missing_tags.is_empty() {
            (
                "TERRAIN_INCOMPATIBLE",
                format!("Remove {} for {} trips", option.name, input.terrain),
            )
        } else {
            (
                "MISSING_REQUIRED_TAGS",
                format!("Pick a van tagged {} or drop {}", missing_tags.join(", "), option.name),
            )
        };

        let message = if missing_tags.is_empty() {
            format!("{} conflicts with current setup", option.name)
        } else {
            format!(
                "{} conflicts with current setup (missing: {})",
                option.name,
                missing_tags.join(",")
            )
        };

        result.violations.push(ConstraintViolation {
            code: code.to_string(),
            option_id: option.id.clone(),
            message,
            missing_tags,
            suggestion: Some(suggestion),
        });
    }

    result.valid = result.violations.is_empty();
    result
}
