use std::collections::{BTreeSet, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::vehicle::{
    Capability, OptionCategory, OptionId, OptionItem, Region, Terrain, VanId, VanModel,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog must contain at least one van")]
    NoVans,
    #[error("duplicate catalog id `{0}`")]
    DuplicateId(String),
}

/// Read-only reference data shared by every session.
///
/// Always holds at least one van, so the never-block fallback in van selection has a
/// candidate to return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Catalog {
    vans: Vec<VanModel>,
    options: Vec<OptionItem>,
}

impl Catalog {
    pub fn new(vans: Vec<VanModel>, options: Vec<OptionItem>) -> Result<Self, CatalogError> {
        if vans.is_empty() {
            return Err(CatalogError::NoVans);
        }

        let mut seen = HashSet::new();
        let ids = vans.iter().map(|van| &van.id.0).chain(options.iter().map(|option| &option.id.0));
        for id in ids {
            if !seen.insert(id.as_str()) {
                return Err(CatalogError::DuplicateId(id.clone()));
            }
        }

        Ok(Self { vans, options })
    }

    pub fn seeded() -> Self {
        Self { vans: seed_vans(), options: seed_options() }
    }

    pub fn vans(&self) -> &[VanModel] {
        &self.vans
    }

    pub fn options(&self) -> &[OptionItem] {
        &self.options
    }

    pub fn van_by_id(&self, van_id: &VanId) -> Option<&VanModel> {
        self.vans.iter().find(|van| &van.id == van_id)
    }

    pub fn option_by_id(&self, option_id: &OptionId) -> Option<&OptionItem> {
        self.options.iter().find(|option| &option.id == option_id)
    }

    /// First van in catalog order.
    pub fn first_van(&self) -> &VanModel {
        &self.vans[0]
    }

    /// Resolves a van id, falling back to the first van for ids the catalog never issued.
    pub fn van_or_first(&self, van_id: &VanId) -> &VanModel {
        self.van_by_id(van_id).unwrap_or_else(|| self.first_van())
    }

    /// Resolves option ids in the given order, silently skipping unknown ones.
    pub fn resolve_options<'a>(&'a self, option_ids: &[OptionId]) -> Vec<&'a OptionItem> {
        option_ids.iter().filter_map(|id| self.option_by_id(id)).collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn van(
    id: &str,
    name: &str,
    base_price: i64,
    max_occupancy: u32,
    range_km: u32,
    terrains: &[Terrain],
    regions: &[Region],
    features: &[&str],
    tags: &[&str],
    capabilities: &[Capability],
    image_hint: &str,
) -> VanModel {
    VanModel {
        id: VanId(id.to_string()),
        name: name.to_string(),
        base_price: Decimal::from(base_price),
        max_occupancy,
        range_km,
        terrains: terrains.iter().copied().collect::<BTreeSet<_>>(),
        regions: regions.iter().copied().collect::<BTreeSet<_>>(),
        features: strings(features),
        tags: strings(tags),
        capabilities: capabilities.iter().copied().collect::<BTreeSet<_>>(),
        image_hint: image_hint.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn option(
    id: &str,
    name: &str,
    description: &str,
    delta_price: i64,
    category: OptionCategory,
    required_tags: &[&str],
    incompatible_tags: &[&str],
    compatibility_note: &str,
) -> OptionItem {
    OptionItem {
        id: OptionId(id.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        delta_price: Decimal::from(delta_price),
        category,
        required_tags: strings(required_tags),
        incompatible_tags: strings(incompatible_tags),
        compatibility_note: compatibility_note.to_string(),
    }
}

fn seed_vans() -> Vec<VanModel> {
    use Capability::{PremiumComfort, SafetyAssist};
    use Region::{Ca, Co, Fl, Nw};
    use Terrain::{Beach, City, Forest, Mountain, Water, Winter};

    vec![
        van(
            "aether-glider",
            "Aether Glider 4x4",
            79_000,
            4,
            540,
            &[Mountain, Forest, City, Winter, Beach],
            &[Co, Nw, Ca],
            &["Solar Array", "Snowmobile Tracks", "Roof Rail Modular", "Remote Climate Pods"],
            &["tracks", "winter", "camping", "modular", "range"],
            &[PremiumComfort, SafetyAssist],
            "4x4 van with bright cargo rack",
        ),
        van(
            "aquilo-orca",
            "Aquila Orca",
            86_500,
            3,
            430,
            &[Beach, Forest, Water, City],
            &[Ca, Fl, Nw],
            &[
                "Water-Tight Hull Kit",
                "Retractable Paddle Assist",
                "Salt-Resistant Shell",
                "All-Weather Lounge",
            ],
            &["water", "amphibious", "beach", "family", "adventure"],
            &[SafetyAssist],
            "camper with side-mounted water fins",
        ),
        van(
            "volt-sprinter",
            "Volt Sprinter Forge",
            94_000,
            5,
            640,
            &[City, Forest, Mountain, Winter],
            &[Ca, Co, Nw, Fl],
            &["Fast Charge", "Smart Camp OS", "Cargo Spine", "Quiet Ride"],
            &["electric", "family", "long-range", "tech-forward"],
            &[PremiumComfort],
            "sleek electric adventure van profile",
        ),
        van(
            "magma-hopper",
            "Magma Hopper",
            72_000,
            2,
            390,
            &[Mountain, Forest, Winter, City],
            &[Co, Nw],
            &["Rugged Exterior", "Ultra Light Frame", "Quick-Tow Rack"],
            &["offgrid", "lightweight", "tracks", "offroad"],
            &[],
            "compact offroad van with bright yellow trim",
        ),
        van(
            "storm-reef-ranger",
            "Storm Reef Ranger",
            109_000,
            4,
            610,
            &[Beach, Water, Forest, City],
            &[Ca, Fl, Nw, Co],
            &["HydroJet Assist", "Reinforced Axle", "Auto Deck Lock", "Dual-Deck Sleep"],
            &["water", "family", "amphibious", "adventure"],
            &[SafetyAssist],
            "van in surf-ready mode with side floats",
        ),
        van(
            "aurora-arc",
            "Aurora Arc 7",
            128_000,
            6,
            700,
            &[City, Mountain, Forest, Winter, Beach, Water],
            &[Ca, Co, Fl, Nw],
            &["Autosteer Assist", "Cold-Weather Pod", "Modular Water Skis", "Solar Skin"],
            &["electric", "luxury", "family", "water", "winter", "tracks", "camping"],
            &[PremiumComfort, SafetyAssist],
            "luxury camper with dramatic LED trim",
        ),
    ]
}

fn seed_options() -> Vec<OptionItem> {
    use OptionCategory::{Comfort, Offroad, Propulsion, Water};

    vec![
        option(
            "option-snow-traction",
            "Snowmobile Tracks",
            "Magnetic track pack for hard-snow and steep grades.",
            8_200,
            Offroad,
            &["tracks"],
            &["water"],
            "Great in mountain/winter. Not approved for deep saltwater usage.",
        ),
        option(
            "option-amphibious-kit",
            "Amphibious Water Glide Kit",
            "Adds amphibious mode and quick-seal undercarriage.",
            9_600,
            Water,
            &["water"],
            &["winter"],
            "Requires water-safe body handling and crew comfort mode.",
        ),
        option(
            "option-solar-canopy",
            "Solar Canopy Array",
            "Retractable solar roof for daytime charging and shade.",
            4_500,
            Comfort,
            &[],
            &[],
            "No known conflicts.",
        ),
        option(
            "option-family-safety",
            "Family Command Pod",
            "Dual-screen command console with kid-safe quick-alert logic.",
            2_800,
            Comfort,
            &[],
            &[],
            "Best fit for family-oriented flows.",
        ),
        option(
            "option-offroad-cabin",
            "Rapid Lift Camp Cabin",
            "Pop-up elevated cabin with quick set-up tent frame.",
            5_200,
            Comfort,
            &["offroad", "family"],
            &[],
            "Pairs best with offroad-capable layouts.",
        ),
        option(
            "option-titan-clamp",
            "Titan Tow Clamp Pack",
            "Heavy-duty rear package for long haulers and cargo trailers.",
            3_900,
            Propulsion,
            &[],
            &[],
            "Pairs with family and utility builds.",
        ),
        option(
            "option-lake-mode",
            "Lake Mode Thrusters",
            "Adds stabilization jets for dock launches and shallow-water exits.",
            7_600,
            Water,
            &["water"],
            &["winter"],
            "Requires certified water-sealed wheels and calm-weather confidence.",
        ),
        option(
            "option-quiet-cab",
            "QuietPod Climate Shell",
            "Whisper-quiet climate and cabin isolation for nighttime comfort.",
            3_700,
            Comfort,
            &[],
            &[],
            "Popular with family and overnight trips.",
        ),
    ]
}
