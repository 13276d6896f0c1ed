//! Flat index: exhaustive exact search.
//!
//! This is the correctness oracle for the approximate indexes. Every query
//! computes the distance to every indexed document, so it costs O(N * D).

use std::collections::BTreeSet;

use crate::error::Result;
use crate::vector::core::distance::L2Distance;
use crate::vector::core::hit::TopK;
use crate::vector::core::vector::DocVectorAccess;
use crate::vector::index::{NearestNeighborIndex, validate_dimension, validate_doc_vector, validate_query};
use crate::vector::search::scan;

/// Exact brute-force index.
///
/// Documents are scanned in ascending id order, which makes results
/// independent of the order in which they were added.
#[derive(Debug)]
pub struct FlatIndex<S> {
    metric: L2Distance,
    store: S,
    doc_ids: BTreeSet<u32>,
}

impl<S: DocVectorAccess> FlatIndex<S> {
    /// Create an empty flat index.
    pub fn new(dimension: usize, store: S) -> Result<Self> {
        Self::with_metric(L2Distance::new(dimension), store)
    }

    /// Create an empty flat index with an explicit metric.
    pub fn with_metric(metric: L2Distance, store: S) -> Result<Self> {
        validate_dimension(metric.dimension())?;
        Ok(Self {
            metric,
            store,
            doc_ids: BTreeSet::new(),
        })
    }

    /// Exact `k` nearest documents to `query`.
    pub fn brute_force(&self, query: &[f32], k: usize) -> Result<TopK> {
        validate_query(&self.metric, k, query, k, self.doc_ids.len())?;
        scan::exact_top_k(
            &self.metric,
            &self.store,
            query,
            self.doc_ids.iter().copied(),
            k,
        )
    }

    /// Indexed document ids in ascending order.
    pub fn doc_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.doc_ids.iter().copied()
    }

    /// Whether `doc_id` has been indexed.
    pub fn contains(&self, doc_id: u32) -> bool {
        self.doc_ids.contains(&doc_id)
    }

    /// The metric used for ranking.
    pub fn metric(&self) -> &L2Distance {
        &self.metric
    }

    /// The underlying storage provider.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: DocVectorAccess> NearestNeighborIndex for FlatIndex<S> {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn dimension(&self) -> usize {
        self.metric.dimension()
    }

    fn len(&self) -> usize {
        self.doc_ids.len()
    }

    fn add_doc(&mut self, doc_id: u32) -> Result<()> {
        validate_doc_vector(&self.metric, doc_id, self.store.get(doc_id))?;
        self.doc_ids.insert(doc_id);
        Ok(())
    }

    /// The budget is validated like everywhere else but otherwise ignored:
    /// the scan always covers every document.
    fn top_k(&self, k: usize, query: &[f32], budget: usize) -> Result<TopK> {
        validate_query(&self.metric, k, query, budget, self.doc_ids.len())?;
        self.brute_force(query, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HalberdError;
    use crate::vector::core::vector::DenseVectorStore;

    fn sample_store() -> DenseVectorStore {
        DenseVectorStore::from_vectors(
            4,
            [
                [5.0f32, 5.0, 5.0, 5.0],
                [0.0, 0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0],
                [10.0, 0.0, 0.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_brute_force_scenario() {
        let store = sample_store();
        let mut index = FlatIndex::new(4, &store).unwrap();
        for doc_id in 1..=3 {
            index.add_doc(doc_id).unwrap();
        }

        let result = index.brute_force(&[0.0, 0.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!((result[0].doc_id, result[0].distance), (1, 0.0));
        assert_eq!((result[1].doc_id, result[1].distance), (2, 1.0));

        // doc 0 was never added, so it is never returned
        let all = index.brute_force(&[5.0, 5.0, 5.0, 5.0], 3).unwrap();
        assert!(!all.doc_ids().contains(&0));
    }

    #[test]
    fn test_empty_index() {
        let store = sample_store();
        let index = FlatIndex::new(4, &store).unwrap();
        assert!(index.is_empty());
        assert!(matches!(
            index.brute_force(&[0.0; 4], 1),
            Err(HalberdError::InsufficientData {
                requested: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn test_zero_k_and_too_large_k() {
        let store = sample_store();
        let mut index = FlatIndex::new(4, &store).unwrap();
        index.add_doc(1).unwrap();
        index.add_doc(2).unwrap();

        assert!(matches!(
            index.top_k(0, &[0.0; 4], 10),
            Err(HalberdError::InvalidArgument(_))
        ));
        assert!(matches!(
            index.top_k(3, &[0.0; 4], 10),
            Err(HalberdError::InsufficientData { .. })
        ));
        assert!(matches!(
            index.top_k(1, &[0.0; 3], 10),
            Err(HalberdError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let store = sample_store();
        let mut index = FlatIndex::new(4, &store).unwrap();
        index.add_doc(2).unwrap();
        index.add_doc(2).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains(2));
        assert!(!index.contains(3));
    }

    #[test]
    fn test_add_doc_with_wrong_dimension() {
        let store = sample_store();
        let mut index = FlatIndex::new(3, &store).unwrap();
        assert!(matches!(
            index.add_doc(0),
            Err(HalberdError::DimensionMismatch {
                expected: 3,
                actual: 4
            })
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_zero_dimension_is_rejected() {
        let store = sample_store();
        assert!(FlatIndex::new(0, &store).is_err());
    }
}
