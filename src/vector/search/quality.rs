//! Quality of an approximate result measured against the exact oracle.
//!
//! Two numbers are reported for a query answered by both the oracle and an
//! approximate index with the same K:
//!
//! - recall: how many oracle documents the approximate result also contains,
//!   regardless of rank
//! - distance ratio (c-factor): `approx[i].distance / oracle[i].distance` per
//!   rank, summarized by its maximum and mean; 1.0 means exact

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};
use crate::vector::core::hit::TopK;

/// Quality of one approximate result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Number of hits compared.
    pub k: usize,
    /// Documents present in both results (0..=k).
    pub recall: usize,
    /// Largest per-rank distance ratio, never below 1.0.
    pub max_ratio: f64,
    /// Mean per-rank distance ratio.
    pub mean_ratio: f64,
}

impl QualityReport {
    /// Recall as a fraction of k.
    pub fn recall_fraction(&self) -> f64 {
        self.recall as f64 / self.k as f64
    }

    /// True when the approximate result is as good as the oracle's.
    pub fn is_exact(&self) -> bool {
        self.recall == self.k && self.max_ratio == 1.0
    }
}

/// Number of documents present in both results.
pub fn recall(oracle: &TopK, approx: &TopK) -> usize {
    let expected: AHashSet<u32> = oracle.iter().map(|hit| hit.doc_id).collect();
    approx
        .iter()
        .filter(|hit| expected.contains(&hit.doc_id))
        .count()
}

/// Per-rank distance ratios `approx[i] / oracle[i]`.
pub fn distance_ratios(oracle: &TopK, approx: &TopK) -> Result<Vec<f64>> {
    check_comparable(oracle, approx)?;

    oracle
        .iter()
        .zip(approx.iter())
        .enumerate()
        .map(|(rank, (exact, found))| {
            if exact.distance == 0.0 {
                Err(HalberdError::degenerate_query(rank))
            } else {
                Ok(found.distance / exact.distance)
            }
        })
        .collect()
}

/// Full quality report for one query.
pub fn evaluate(oracle: &TopK, approx: &TopK) -> Result<QualityReport> {
    let ratios = distance_ratios(oracle, approx)?;
    let max_ratio = ratios.iter().copied().fold(1.0, f64::max);
    let mean_ratio = ratios.iter().sum::<f64>() / ratios.len() as f64;

    Ok(QualityReport {
        k: oracle.len(),
        recall: recall(oracle, approx),
        max_ratio,
        mean_ratio,
    })
}

fn check_comparable(oracle: &TopK, approx: &TopK) -> Result<()> {
    if oracle.is_empty() {
        return Err(HalberdError::invalid_argument(
            "cannot evaluate an empty oracle result",
        ));
    }
    if oracle.len() != approx.len() {
        return Err(HalberdError::invalid_argument(format!(
            "results differ in length: oracle has {} hits, approximate has {}",
            oracle.len(),
            approx.len()
        )));
    }
    Ok(())
}
