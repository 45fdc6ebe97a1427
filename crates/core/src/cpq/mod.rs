pub mod catalog;
pub mod constraints;
pub mod pricing;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::session::normalize_moods;
use crate::domain::vehicle::{BudgetBand, Capability, OptionItem, Region, Terrain, VanModel};

use self::{
    catalog::Catalog,
    constraints::{
        is_compatible, ConstraintEngine, ConstraintInput, ConstraintResult,
        DeterministicConstraintEngine,
    },
    pricing::{DeterministicPricingEngine, PricingEngine, PricingResult},
};

/// Moods assumed when a customer states none.
pub const SAFE_DEFAULT_MOODS: [&str; 2] = ["family", "safety"];

const WATER_MOOD_ORDERING_DISCOUNT: i64 = 800;

/// Normalised moods, or the safe defaults when nothing usable was supplied.
pub fn effective_moods<S: AsRef<str>>(moods: &[S]) -> Vec<String> {
    let normalized = normalize_moods(moods);
    if normalized.is_empty() {
        SAFE_DEFAULT_MOODS.iter().map(|mood| (*mood).to_string()).collect()
    } else {
        normalized
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ScoringProfile<'a> {
    pub budget: Decimal,
    pub terrain: Terrain,
    pub region: Region,
    pub moods: &'a [String],
}

/// Fit score for one van, or `None` when a hard filter excludes it.
pub fn score_van(van: &VanModel, profile: &ScoringProfile<'_>) -> Option<i32> {
    if van.base_price > profile.budget {
        return None;
    }
    if !van.serves_region(profile.region) {
        return None;
    }
    if !van.supports_terrain(profile.terrain) && !van.supports_terrain(Terrain::City) {
        return None;
    }

    let moods = effective_moods(profile.moods);
    let has = |mood: &str| moods.iter().any(|candidate| candidate == mood);

    let mut score = 0;
    if has("family") && van.max_occupancy > 3 {
        score += 30;
    }
    if has("luxury") && van.has_capability(Capability::PremiumComfort) {
        score += 25;
    }
    if has("winter") {
        score += if van.supports_terrain(Terrain::Winter) { 35 } else { -20 };
    }
    if has("water") {
        score += if van.has_tag("water") { 45 } else { -30 };
    }
    if has("adventure") {
        score += if van.has_tag("tracks") || van.has_tag("offroad") { 30 } else { 5 };
    }
    if has("safety") {
        score += if van.has_capability(Capability::SafetyAssist) { 20 } else { 10 };
    }

    Some(score)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VanChoice<'a> {
    Scored { van: &'a VanModel, score: i32 },
    /// No van passed the hard filters; the flow still needs something to show.
    Fallback { van: &'a VanModel },
}

impl<'a> VanChoice<'a> {
    pub fn van(&self) -> &'a VanModel {
        match self {
            Self::Scored { van, .. } | Self::Fallback { van } => van,
        }
    }

    pub fn score(&self) -> i32 {
        match self {
            Self::Scored { score, .. } => *score,
            Self::Fallback { .. } => 0,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Highest-scoring eligible van; ties go to the earliest catalog entry.
pub fn choose_van<'a>(catalog: &'a Catalog, profile: &ScoringProfile<'_>) -> VanChoice<'a> {
    let mut best: Option<(&VanModel, i32)> = None;

    for van in catalog.vans() {
        let Some(score) = score_van(van, profile) else { continue };
        // negative totals are treated like ineligible vans
        if score < 0 {
            continue;
        }
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((van, score));
        }
    }

    match best {
        Some((van, score)) => VanChoice::Scored { van, score },
        None => VanChoice::Fallback { van: catalog.first_van() },
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub van: VanModel,
    pub options: Vec<OptionItem>,
    pub estimated_price: Decimal,
}

fn ordering_price(option: &OptionItem, water_mood: bool) -> Decimal {
    if water_mood && option.requires_tag("water") {
        option.delta_price - Decimal::from(WATER_MOOD_ORDERING_DISCOUNT)
    } else {
        option.delta_price
    }
}

/// Compatible options for the given van tags, cheapest first, paired with the narrative
/// baseline van: the cheapest van priced within the luxury band.
pub fn build_recommendation<S: AsRef<str>>(
    catalog: &Catalog,
    van_tags: &[String],
    terrain: Terrain,
    moods: &[S],
) -> Recommendation {
    let water_mood = effective_moods(moods).iter().any(|mood| mood == "water");

    let mut options: Vec<OptionItem> = catalog
        .options()
        .iter()
        .filter(|option| is_compatible(van_tags, option, terrain))
        .cloned()
        .collect();
    options.sort_by_key(|option| ordering_price(option, water_mood));

    let ceiling = BudgetBand::Luxury.ceiling();
    let van = catalog
        .vans()
        .iter()
        .filter(|van| van.base_price <= ceiling)
        .min_by_key(|van| van.base_price)
        .unwrap_or_else(|| catalog.first_van())
        .clone();

    let estimated_price =
        van.base_price + options.iter().map(|option| option.delta_price).sum::<Decimal>();

    Recommendation { van, options, estimated_price }
}

#[derive(Clone, Debug)]
pub struct CpqEvaluationInput<'a> {
    pub van: &'a VanModel,
    pub terrain: Terrain,
    pub selected: Vec<&'a OptionItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpqEvaluation {
    pub constraints: ConstraintResult,
    pub pricing: PricingResult,
}

pub trait CpqRuntime: Send + Sync {
    fn evaluate_configuration(&self, input: CpqEvaluationInput<'_>) -> CpqEvaluation;
}

pub struct DeterministicCpqRuntime<C, P> {
    constraint_engine: C,
    pricing_engine: P,
}

impl<C, P> DeterministicCpqRuntime<C, P> {
    pub fn new(constraint_engine: C, pricing_engine: P) -> Self {
        Self { constraint_engine, pricing_engine }
    }
}

impl Default
    for DeterministicCpqRuntime<DeterministicConstraintEngine, DeterministicPricingEngine>
{
    fn default() -> Self {
        Self::new(DeterministicConstraintEngine, DeterministicPricingEngine)
    }
}

impl<C, P> CpqRuntime for DeterministicCpqRuntime<C, P>
where
    C: ConstraintEngine,
    P: PricingEngine,
{
    fn evaluate_configuration(&self, input: CpqEvaluationInput<'_>) -> CpqEvaluation {
        let pricing = self.pricing_engine.price(input.van, &input.selected);
        let constraints = self.constraint_engine.validate(&ConstraintInput {
            van: input.van,
            terrain: input.terrain,
            selected: input.selected,
        });

        CpqEvaluation { constraints, pricing }
    }
}
