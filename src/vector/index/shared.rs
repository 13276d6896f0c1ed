//! Index wrapper that allows insertion while other threads query.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::vector::core::hit::TopK;
use crate::vector::index::NearestNeighborIndex;

/// A cloneable handle to an index behind a read-write lock.
///
/// Insertions take the write lock and queries the read lock, so a query never
/// sees a tree or bucket in the middle of being restructured.
pub struct SharedIndex<I> {
    inner: Arc<RwLock<I>>,
}

impl<I> Clone for SharedIndex<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: NearestNeighborIndex> SharedIndex<I> {
    /// Wrap an index.
    pub fn new(index: I) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Index a document under the write lock.
    pub fn add_doc(&self, doc_id: u32) -> Result<()> {
        self.inner.write().add_doc(doc_id)
    }

    /// Query under the read lock.
    pub fn top_k(&self, k: usize, query: &[f32], budget: usize) -> Result<TopK> {
        self.inner.read().top_k(k, query, budget)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// True when no document has been indexed.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Run `f` with exclusive access, e.g. to rebuild a forest.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut I) -> R) -> R {
        f(&mut self.inner.write())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::vector::core::vector::DenseVectorStore;
    use crate::vector::index::forest::ForestIndex;
    use crate::vector::index::config::{ForestIndexConfig, IndexConfig, IndexKind};
    use crate::vector::index::factory::create_index;

    fn grid_store() -> Arc<DenseVectorStore> {
        let vectors = (0..400u32).map(|i| [(i % 20) as f32, (i / 20) as f32]);
        Arc::new(DenseVectorStore::from_vectors(2, vectors).unwrap())
    }

    #[test]
    fn test_concurrent_insert_and_query() {
        let store = grid_store();
        let config = ForestIndexConfig {
            num_trees: 3,
            max_leaf_size: 16,
            ..ForestIndexConfig::default()
        };
        let shared = SharedIndex::new(ForestIndex::with_config(2, Arc::clone(&store), config).unwrap());
        shared.add_doc(0).unwrap();

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for doc_id in 1..400 {
                    shared.add_doc(doc_id).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let result = shared.top_k(1, &[0.0, 0.0], 400).unwrap();
                        assert_eq!(result[0].doc_id, 0);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(shared.len(), 400);
        shared.with_write(|forest| forest.rebuild());
        assert_eq!(shared.top_k(1, &[19.0, 19.0], 400).unwrap()[0].doc_id, 399);
    }

    #[test]
    fn test_boxed_index() {
        let store = grid_store();
        let index = create_index(&IndexConfig::new(IndexKind::Lsh, 2), store).unwrap();
        let shared = SharedIndex::new(index);
        assert!(shared.is_empty());
        shared.add_doc(5).unwrap();
        assert_eq!(shared.top_k(1, &[5.0, 0.0], 1).unwrap()[0].doc_id, 5);
    }
}
