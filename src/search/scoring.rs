//! Score fusion, provenance boosts, and conflict detection (spec.md §4.5).
//! The 0.9 conflict threshold and the 0.10/0.05 boost weights are literal,
//! undiscussed constants in the original — treated as tunables here too
//! (see DESIGN.md's Open Question notes).

use std::collections::HashMap;

use uuid::Uuid;

pub const LATEST_VERSION_BOOST: f32 = 0.10;
pub const OCR_CONFIDENCE_BOOST_WEIGHT: f32 = 0.05;
pub const CONFLICT_THRESHOLD: f32 = 0.9;

/// Min-max normalizes a candidate score map into `[0,1]`. An empty map
/// stays empty; a zero-spread map (including a single candidate) maps
/// every score to `1.0`.
pub fn normalize_scores(scores: &HashMap<Uuid, f32>) -> HashMap<Uuid, f32> {
    if scores.is_empty() {
        return HashMap::new();
    }
    let min = scores.values().copied().fold(f32::INFINITY, f32::min);
    let max = scores.values().copied().fold(f32::NEG_INFINITY, f32::max);
    let spread = max - min;

    scores
        .iter()
        .map(|(id, v)| {
            let norm = if spread <= f32::EPSILON { 1.0 } else { (v - min) / spread };
            (*id, norm)
        })
        .collect()
}

pub fn latest_version_boost(version_id: Uuid, latest_version_id: Option<Uuid>) -> f32 {
    if Some(version_id) == latest_version_id {
        LATEST_VERSION_BOOST
    } else {
        0.0
    }
}

pub fn ocr_confidence_boost(ocr_confidence: Option<f32>) -> f32 {
    ocr_confidence.map(|c| OCR_CONFIDENCE_BOOST_WEIGHT * (c / 100.0)).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_zero_one_range() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let scores = HashMap::from([(a, 1.0), (b, 3.0)]);
        let normalized = normalize_scores(&scores);
        assert_eq!(normalized[&a], 0.0);
        assert_eq!(normalized[&b], 1.0);
    }

    #[test]
    fn single_candidate_normalizes_to_one() {
        let a = Uuid::new_v4();
        let scores = HashMap::from([(a, 5.0)]);
        assert_eq!(normalize_scores(&scores)[&a], 1.0);
    }

    #[test]
    fn empty_spread_normalizes_all_to_one() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let scores = HashMap::from([(a, 2.0), (b, 2.0)]);
        let normalized = normalize_scores(&scores);
        assert_eq!(normalized[&a], 1.0);
        assert_eq!(normalized[&b], 1.0);
    }

    #[test]
    fn boosts_only_apply_when_conditions_hold() {
        let v = Uuid::new_v4();
        assert_eq!(latest_version_boost(v, Some(v)), LATEST_VERSION_BOOST);
        assert_eq!(latest_version_boost(v, Some(Uuid::new_v4())), 0.0);
        assert_eq!(ocr_confidence_boost(None), 0.0);
        assert!((ocr_confidence_boost(Some(80.0)) - 0.04).abs() < 1e-6);
    }
}
