//! Priority scoring for ops board items

use crate::domain::ops::{Level, PriorityLane};

/// Minimum score for the P0 lane
pub const P0_THRESHOLD: f64 = 320.0;
/// Minimum score for the P1 lane
pub const P1_THRESHOLD: f64 = 220.0;

const WEIGHT_SCALE: f64 = 50.0;
const CONFIDENCE_SCALE: f64 = 20.0;

/// `impact × urgency × 50 + confidence × 20`
pub fn score(impact: Level, urgency: Level, confidence: f64) -> f64 {
    f64::from(impact.weight() * urgency.weight()) * WEIGHT_SCALE + confidence * CONFIDENCE_SCALE
}

/// Map a score onto its priority lane
pub fn priority_label(score: f64) -> PriorityLane {
    if score >= P0_THRESHOLD {
        PriorityLane::P0
    } else if score >= P1_THRESHOLD {
        PriorityLane::P1
    } else {
        PriorityLane::P2
    }
}
