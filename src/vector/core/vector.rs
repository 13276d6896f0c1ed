//! Document vector storage.
//!
//! Indexes never own vectors. They look them up by document id through
//! [`DocVectorAccess`], which the embedding application implements over
//! whatever storage it already has. [`DenseVectorStore`] is the in-memory
//! implementation used by the CLI, the benchmarks and the tests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};

/// Lookup from document id to its vector.
///
/// `get` must succeed for every id that was ever passed to an index's
/// `add_doc`, and must always return vectors of the index dimensionality.
/// Asking for an id the provider never stored is a caller bug; providers are
/// expected to panic rather than return garbage.
pub trait DocVectorAccess: Send + Sync {
    /// The vector stored for `doc_id`.
    fn get(&self, doc_id: u32) -> &[f32];
}

impl<T: DocVectorAccess + ?Sized> DocVectorAccess for &T {
    fn get(&self, doc_id: u32) -> &[f32] {
        (**self).get(doc_id)
    }
}

impl<T: DocVectorAccess + ?Sized> DocVectorAccess for Arc<T> {
    fn get(&self, doc_id: u32) -> &[f32] {
        (**self).get(doc_id)
    }
}

impl<T: DocVectorAccess + ?Sized> DocVectorAccess for Box<T> {
    fn get(&self, doc_id: u32) -> &[f32] {
        (**self).get(doc_id)
    }
}

/// Fixed-dimensionality vectors stored back to back in one allocation.
///
/// Document ids are assigned densely in insertion order, starting at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseVectorStore {
    dimension: usize,
    data: Vec<f32>,
}

impl DenseVectorStore {
    /// Create an empty store. The dimensionality must be at least 1.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_capacity(dimension, 0)
    }

    /// Create an empty store with room for `count` vectors.
    pub fn with_capacity(dimension: usize, count: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(HalberdError::invalid_argument(
                "vector dimensionality must be at least 1",
            ));
        }
        Ok(Self {
            dimension,
            data: Vec::with_capacity(dimension.saturating_mul(count)),
        })
    }

    /// Build a store from a sequence of vectors.
    pub fn from_vectors<I, V>(dimension: usize, vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[f32]>,
    {
        let mut store = Self::new(dimension)?;
        for vector in vectors {
            store.push(vector.as_ref())?;
        }
        Ok(store)
    }

    /// Append a vector and return its document id.
    pub fn push(&mut self, vector: &[f32]) -> Result<u32> {
        if vector.len() != self.dimension {
            return Err(HalberdError::dimension_mismatch(
                self.dimension,
                vector.len(),
            ));
        }
        if let Some(position) = vector.iter().position(|x| !x.is_finite()) {
            return Err(HalberdError::invalid_argument(format!(
                "vector contains a non-finite value at index {position}"
            )));
        }

        let doc_id = u32::try_from(self.len()).map_err(|_| {
            HalberdError::invalid_argument("vector store is full (u32 document ids exhausted)")
        })?;
        self.data.extend_from_slice(vector);
        Ok(doc_id)
    }

    /// Dimensionality of every stored vector.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// True when no vectors are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The vector for `doc_id`, or `None` when it is out of range.
    pub fn vector(&self, doc_id: u32) -> Option<&[f32]> {
        if self.dimension == 0 {
            return None;
        }
        let start = (doc_id as usize).checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// All assigned document ids.
    pub fn doc_ids(&self) -> std::ops::Range<u32> {
        // push() never lets len() exceed u32::MAX
        0..self.len() as u32
    }

    /// The raw contiguous storage.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl DocVectorAccess for DenseVectorStore {
    fn get(&self, doc_id: u32) -> &[f32] {
        match self.vector(doc_id) {
            Some(vector) => vector,
            None => panic!(
                "document id {doc_id} out of range for a store of {} vectors",
                self.len()
            ),
        }
    }
}
