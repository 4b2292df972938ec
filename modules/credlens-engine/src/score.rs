//! Credibility scoring. Pure arithmetic; the order of operations is part of
//! the contract: confidence scaling applies after the artifact and
//! inconsistency penalties but before the cross-reference penalties.

use std::collections::BTreeMap;

use credlens_common::CheckOutcome;

use crate::parser::ModelAnalysis;

/// Presumed-authentic prior.
const BASE_SCORE: f32 = 0.8;
/// Deduction per detected visual artifact.
const ARTIFACT_PENALTY: f32 = 0.08;
/// Deduction per detected contextual inconsistency.
const INCONSISTENCY_PENALTY: f32 = 0.10;
/// Flat deduction per failed or disputing cross-reference source.
const SOURCE_PENALTY: f32 = 0.15;

/// Map a model analysis plus cross-reference outcomes to a credibility score
/// in [0,1].
pub fn calculate(analysis: &ModelAnalysis, db_results: &BTreeMap<String, CheckOutcome>) -> f32 {
    let mut score = BASE_SCORE;

    score -= analysis.artifacts.len() as f32 * ARTIFACT_PENALTY;
    score -= analysis.inconsistencies.len() as f32 * INCONSISTENCY_PENALTY;

    score *= analysis.confidence as f32 / 100.0;

    for outcome in db_results.values() {
        if outcome.counts_against_score() {
            score -= SOURCE_PENALTY;
        }
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credlens_common::Verdict;

    fn analysis(artifacts: usize, inconsistencies: usize, confidence: u8) -> ModelAnalysis {
        ModelAnalysis {
            assessment: String::new(),
            artifacts: vec!["a".to_string(); artifacts],
            inconsistencies: vec!["i".to_string(); inconsistencies],
            confidence,
            claims: Vec::new(),
        }
    }

    #[test]
    fn clean_result_scores_base() {
        let score = calculate(&analysis(0, 0, 100), &BTreeMap::new());
        assert!((score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_confidence_zeroes_everything() {
        let score = calculate(&analysis(10, 10, 0), &BTreeMap::new());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn stays_in_unit_interval_across_grid() {
        for artifacts in 0..=10 {
            for inconsistencies in 0..=10 {
                for confidence in [0u8, 25, 50, 65, 100] {
                    let score =
                        calculate(&analysis(artifacts, inconsistencies, confidence), &BTreeMap::new());
                    assert!(
                        (0.0..=1.0).contains(&score),
                        "out of range for a={artifacts} i={inconsistencies} c={confidence}: {score}"
                    );
                }
            }
        }
    }

    #[test]
    fn penalties_deduct_before_confidence_scaling() {
        // (0.8 - 0.08 - 0.10) * 0.5 = 0.31
        let score = calculate(&analysis(1, 1, 50), &BTreeMap::new());
        assert!((score - 0.31).abs() < 1e-6);
    }

    #[test]
    fn confidence_scales_before_source_penalties() {
        let mut db = BTreeMap::new();
        db.insert("snopes".to_string(), CheckOutcome::failed("timeout"));

        // 0.8 * 0.5 - 0.15 = 0.25, not (0.8 - 0.15) * 0.5 = 0.325.
        let score = calculate(&analysis(0, 0, 50), &db);
        assert!((score - 0.25).abs() < 1e-6);
    }

    #[test]
    fn disputed_verdict_counts_like_error() {
        let mut db = BTreeMap::new();
        db.insert(
            "snopes".to_string(),
            CheckOutcome {
                verdict: Verdict::False,
                ..CheckOutcome::undetermined()
            },
        );
        db.insert("fullfact".to_string(), CheckOutcome::undetermined());

        // 0.8 * 1.0 - 0.15 = 0.65; the undetermined source costs nothing.
        let score = calculate(&analysis(0, 0, 100), &db);
        assert!((score - 0.65).abs() < 1e-6);
    }

    #[test]
    fn many_failures_clamp_at_zero() {
        let mut db = BTreeMap::new();
        for name in ["a", "b", "c", "d", "e", "f"] {
            db.insert(name.to_string(), CheckOutcome::failed("down"));
        }
        assert_eq!(calculate(&analysis(0, 0, 100), &db), 0.0);
    }
}
