//! Hash-bucket index over random projections.
//!
//! A fixed set of Gaussian random directions, drawn once at construction,
//! maps every vector to a signature with one bit per direction (set when the
//! vector lies on the positive side). Documents with equal signatures share a
//! bucket. A query visits buckets in order of increasing Hamming distance
//! between their signature and the query's until enough candidates are
//! gathered, then ranks the candidates exactly.

use std::f64::consts::TAU;

use ahash::{AHashMap, AHashSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::vector::core::distance::L2Distance;
use crate::vector::core::hit::TopK;
use crate::vector::core::vector::DocVectorAccess;
use crate::vector::index::config::LshIndexConfig;
use crate::vector::index::{NearestNeighborIndex, validate_dimension, validate_doc_vector, validate_query};
use crate::vector::search::scan;

/// Approximate index that buckets documents by projection sign signature.
#[derive(Debug)]
pub struct LshIndex<S> {
    config: LshIndexConfig,
    metric: L2Distance,
    store: S,
    /// `num_projections` direction vectors, stored back to back.
    projections: Vec<f32>,
    buckets: AHashMap<u64, Vec<u32>>,
    doc_ids: AHashSet<u32>,
}

/// Standard normal sample via the Box-Muller transform.
fn gaussian(rng: &mut StdRng) -> f32 {
    // 1 - u keeps the logarithm argument in (0, 1]
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    ((-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()) as f32
}

impl<S: DocVectorAccess> LshIndex<S> {
    /// Create an empty index with default parameters.
    pub fn new(dimension: usize, store: S) -> Result<Self> {
        Self::with_config(dimension, store, LshIndexConfig::default())
    }

    /// Create an empty index.
    pub fn with_config(dimension: usize, store: S, config: LshIndexConfig) -> Result<Self> {
        validate_dimension(dimension)?;
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let projections = (0..config.num_projections * dimension)
            .map(|_| gaussian(&mut rng))
            .collect();

        tracing::debug!(
            dimension,
            num_projections = config.num_projections,
            "creating hash-bucket index"
        );

        Ok(Self {
            config,
            metric: L2Distance::new(dimension),
            store,
            projections,
            buckets: AHashMap::new(),
            doc_ids: AHashSet::new(),
        })
    }

    /// The parameters this index was built with.
    pub fn config(&self) -> &LshIndexConfig {
        &self.config
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Signature of `vector`: bit `i` is set when projection `i` is non-negative.
    pub fn signature(&self, vector: &[f32]) -> u64 {
        self.projections
            .chunks_exact(self.metric.dimension())
            .enumerate()
            .fold(0u64, |signature, (bit, projection)| {
                if self.metric.dot_product(projection, vector) >= 0.0 {
                    signature | (1u64 << bit)
                } else {
                    signature
                }
            })
    }

    fn hamming_distance(&self, a: u64, b: u64) -> u64 {
        self.metric.math().population_count(&[a ^ b])
    }

    /// Gather whole buckets, nearest signatures first, until at least
    /// `budget` candidates are collected. Returned in ascending id order.
    fn collect_candidates(&self, query: &[f32], budget: usize) -> Vec<u32> {
        let query_signature = self.signature(query);

        let mut order: Vec<(u64, u64)> = self
            .buckets
            .keys()
            .map(|&signature| (self.hamming_distance(signature, query_signature), signature))
            .collect();
        order.sort_unstable();

        let mut candidates = Vec::with_capacity(budget);
        let mut visited_buckets = 0usize;
        for (_, signature) in order {
            if candidates.len() >= budget {
                break;
            }
            if let Some(members) = self.buckets.get(&signature) {
                candidates.extend_from_slice(members);
                visited_buckets += 1;
            }
        }

        tracing::trace!(
            budget,
            candidates = candidates.len(),
            visited_buckets,
            "hash-bucket candidates collected"
        );

        candidates.sort_unstable();
        candidates
    }
}

impl<S: DocVectorAccess> NearestNeighborIndex for LshIndex<S> {
    fn name(&self) -> &'static str {
        "lsh"
    }

    fn dimension(&self) -> usize {
        self.metric.dimension()
    }

    fn len(&self) -> usize {
        self.doc_ids.len()
    }

    fn add_doc(&mut self, doc_id: u32) -> Result<()> {
        let vector = self.store.get(doc_id);
        validate_doc_vector(&self.metric, doc_id, vector)?;
        if !self.doc_ids.insert(doc_id) {
            return Ok(());
        }

        let signature = self.signature(vector);
        self.buckets.entry(signature).or_default().push(doc_id);
        Ok(())
    }

    fn top_k(&self, k: usize, query: &[f32], budget: usize) -> Result<TopK> {
        validate_query(&self.metric, k, query, budget, self.doc_ids.len())?;
        let candidates = self.collect_candidates(query, budget);
        scan::exact_top_k(&self.metric, &self.store, query, candidates, k)
    }
}
