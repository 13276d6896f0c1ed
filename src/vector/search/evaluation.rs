//! Batch quality evaluation of an index over a query set.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};
use crate::vector::core::hit::TopK;
use crate::vector::core::vector::{DenseVectorStore, DocVectorAccess};
use crate::vector::index::NearestNeighborIndex;
use crate::vector::index::flat::FlatIndex;
use crate::vector::search::quality;

/// Aggregated quality and timing of one index configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Index variant name.
    pub index: String,
    /// Hits requested per query.
    pub k: usize,
    /// Search budget per query.
    pub budget: usize,
    /// Number of queries run.
    pub queries: usize,
    /// Mean recall as a fraction of k.
    pub mean_recall: f64,
    /// Worst recall count over all queries.
    pub min_recall: usize,
    /// Largest distance ratio over all non-degenerate queries.
    pub max_ratio: f64,
    /// Mean of the per-query mean ratios.
    pub mean_ratio: f64,
    /// Queries skipped for ratios because an oracle distance was zero.
    pub degenerate_queries: usize,
    /// Wall time of the whole batch in milliseconds.
    pub elapsed_ms: f64,
}

impl EvaluationSummary {
    /// Wall time divided by the number of queries.
    pub fn per_query_ms(&self) -> f64 {
        if self.queries == 0 {
            0.0
        } else {
            self.elapsed_ms / self.queries as f64
        }
    }
}

/// Ranks at which [`verify_ground_truth`] samples the distance ratio profile,
/// in addition to the median and the farthest document.
const PROFILE_RANKS: [usize; 8] = [1, 3, 10, 30, 100, 300, 1000, 3000];

/// Slack allowed when comparing a rescanned distance with the oracle's.
const VERIFY_TOLERANCE: f64 = 1e-6;

/// Outcome of re-checking exact results against a full scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthCheck {
    /// Queries for which some indexed document is closer than the reported
    /// nearest hit.
    pub violations: usize,
    /// `(rank, ratio)` pairs for the first query: every indexed document's
    /// distance over the nearest distance, sorted, sampled at fixed ranks.
    /// Empty when the nearest distance is zero.
    pub ratio_profile: Vec<(usize, f64)>,
}

/// Exact results for every query, computed in parallel.
pub fn ground_truth<S>(oracle: &FlatIndex<S>, queries: &DenseVectorStore, k: usize) -> Result<Vec<TopK>>
where
    S: DocVectorAccess,
{
    let start = Instant::now();
    let truth = queries
        .doc_ids()
        .into_par_iter()
        .map(|query_id| oracle.brute_force(queries.get(query_id), k))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        queries = truth.len(),
        k,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "computed ground truth"
    );
    Ok(truth)
}

/// Rescan every indexed document for every query and check that none is
/// closer than the nearest hit in `truth`.
pub fn verify_ground_truth<S>(
    oracle: &FlatIndex<S>,
    queries: &DenseVectorStore,
    truth: &[TopK],
) -> Result<GroundTruthCheck>
where
    S: DocVectorAccess,
{
    if truth.len() != queries.len() {
        return Err(HalberdError::invalid_argument(format!(
            "{} ground truth results for {} queries",
            truth.len(),
            queries.len()
        )));
    }

    let scan = |query_id: u32| -> Vec<f64> {
        let metric = oracle.metric();
        let query = queries.get(query_id);
        let mut scratch = metric.scratch();
        oracle
            .doc_ids()
            .map(|doc_id| metric.distance_unchecked(query, oracle.store().get(doc_id), &mut scratch))
            .collect()
    };

    let violations = queries
        .doc_ids()
        .into_par_iter()
        .filter(|&query_id| {
            truth[query_id as usize].hits().first().is_some_and(|nearest| {
                scan(query_id)
                    .into_iter()
                    .any(|distance| distance + VERIFY_TOLERANCE < nearest.distance)
            })
        })
        .count();

    let ratio_profile = match truth.first().and_then(|top| top.hits().first()) {
        Some(nearest) if nearest.distance > 0.0 => {
            let mut ratios: Vec<f64> = scan(0)
                .into_iter()
                .map(|distance| distance / nearest.distance)
                .collect();
            ratios.sort_unstable_by(f64::total_cmp);

            let count = ratios.len();
            let mut ranks: Vec<usize> = PROFILE_RANKS
                .into_iter()
                .chain([count / 2, count.saturating_sub(1)])
                .filter(|&rank| rank < count)
                .collect();
            ranks.sort_unstable();
            ranks.dedup();
            ranks.into_iter().map(|rank| (rank, ratios[rank])).collect()
        }
        _ => Vec::new(),
    };

    if violations > 0 {
        tracing::warn!(violations, "exact results missed closer documents");
    }
    Ok(GroundTruthCheck {
        violations,
        ratio_profile,
    })
}

/// Run every query against `index` and compare with `truth`.
pub fn evaluate_index<I>(
    index: &I,
    queries: &DenseVectorStore,
    truth: &[TopK],
    k: usize,
    budget: usize,
) -> Result<EvaluationSummary>
where
    I: NearestNeighborIndex + ?Sized,
{
    if truth.len() != queries.len() {
        return Err(HalberdError::invalid_argument(format!(
            "{} ground truth results for {} queries",
            truth.len(),
            queries.len()
        )));
    }
    if queries.is_empty() {
        return Err(HalberdError::invalid_argument("no queries to evaluate"));
    }

    let start = Instant::now();
    let results = queries
        .doc_ids()
        .into_par_iter()
        .map(|query_id| index.top_k(k, queries.get(query_id), budget))
        .collect::<Result<Vec<_>>>()?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut recall_sum = 0usize;
    let mut min_recall = usize::MAX;
    let mut max_ratio = 1.0f64;
    let mut ratio_sum = 0.0f64;
    let mut degenerate_queries = 0usize;

    for (exact, found) in truth.iter().zip(results.iter()) {
        let recall = quality::recall(exact, found);
        recall_sum += recall;
        min_recall = min_recall.min(recall);

        match quality::evaluate(exact, found) {
            Ok(report) => {
                max_ratio = max_ratio.max(report.max_ratio);
                ratio_sum += report.mean_ratio;
            }
            Err(HalberdError::DegenerateQuery { .. }) => degenerate_queries += 1,
            Err(err) => return Err(err),
        }
    }

    let rated = queries.len() - degenerate_queries;
    let summary = EvaluationSummary {
        index: index.name().to_string(),
        k,
        budget,
        queries: queries.len(),
        mean_recall: recall_sum as f64 / (queries.len() * k) as f64,
        min_recall,
        max_ratio,
        mean_ratio: if rated == 0 { 1.0 } else { ratio_sum / rated as f64 },
        degenerate_queries,
        elapsed_ms,
    };

    tracing::info!(
        index = %summary.index,
        budget,
        mean_recall = summary.mean_recall,
        max_ratio = summary.max_ratio,
        per_query_ms = summary.per_query_ms(),
        "evaluated index"
    );
    Ok(summary)
}
