use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VanId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionId(pub String);

impl fmt::Display for VanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Mountain,
    Beach,
    Forest,
    Winter,
    City,
    Water,
}

impl Terrain {
    pub const ALL: [Terrain; 6] = [
        Terrain::Mountain,
        Terrain::Beach,
        Terrain::Forest,
        Terrain::Winter,
        Terrain::City,
        Terrain::Water,
    ];

    /// Terrain keyword as it appears in option incompatibility tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mountain => "mountain",
            Self::Beach => "beach",
            Self::Forest => "forest",
            Self::Winter => "winter",
            Self::City => "city",
            Self::Water => "water",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Terrain {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|terrain| terrain.as_str() == normalized)
            .ok_or_else(|| format!("unsupported terrain `{value}`"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Nw,
    Ca,
    Co,
    Fl,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nw => "NW",
            Self::Ca => "CA",
            Self::Co => "CO",
            Self::Fl => "FL",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named budget tier resolving to a fixed spending ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum BudgetBand {
    Value,
    Balanced,
    Premium,
    Luxury,
}

impl BudgetBand {
    pub fn ceiling(&self) -> Decimal {
        match self {
            Self::Value => Decimal::from(52_000),
            Self::Balanced => Decimal::from(82_000),
            Self::Premium => Decimal::from(109_000),
            Self::Luxury => Decimal::from(145_000),
        }
    }
}

/// Enumerated van capabilities used by mood scoring in place of feature-text matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Smart/climate/pod/roof/comfort class features.
    PremiumComfort,
    /// Climate/pod/assist/safe class features.
    SafetyAssist,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionCategory {
    Propulsion,
    Comfort,
    Offroad,
    Water,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VanModel {
    pub id: VanId,
    pub name: String,
    pub base_price: Decimal,
    pub max_occupancy: u32,
    pub range_km: u32,
    pub terrains: BTreeSet<Terrain>,
    pub regions: BTreeSet<Region>,
    pub features: Vec<String>,
    pub tags: Vec<String>,
    pub capabilities: BTreeSet<Capability>,
    pub image_hint: String,
}

impl VanModel {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    pub fn supports_terrain(&self, terrain: Terrain) -> bool {
        self.terrains.contains(&terrain)
    }

    pub fn serves_region(&self, region: Region) -> bool {
        self.regions.contains(&region)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    pub id: OptionId,
    pub name: String,
    pub description: String,
    pub delta_price: Decimal,
    pub category: OptionCategory,
    pub required_tags: Vec<String>,
    pub incompatible_tags: Vec<String>,
    pub compatibility_note: String,
}

impl OptionItem {
    pub fn requires_tag(&self, tag: &str) -> bool {
        self.required_tags.iter().any(|candidate| candidate == tag)
    }

    pub fn is_incompatible_with(&self, tag: &str) -> bool {
        self.incompatible_tags.iter().any(|candidate| candidate == tag)
    }
}
