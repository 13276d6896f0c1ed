//! # Halberd
//!
//! Approximate nearest-neighbor search for dense `f32` vectors.
//!
//! ## Features
//!
//! - Exact brute-force oracle
//! - Random-projection forest and sign-hash (LSH) indexes with a per-query
//!   candidate budget
//! - Recall and distance-ratio measurement against the oracle
//! - Runtime-selected SIMD distance kernels
//!
//! ## Example
//!
//! ```
//! use halberd::vector::{DenseVectorStore, FlatIndex, NearestNeighborIndex};
//!
//! let store = DenseVectorStore::from_vectors(
//!     2,
//!     [[0.0f32, 0.0], [1.0, 0.0], [5.0, 5.0]],
//! ).unwrap();
//!
//! let mut index = FlatIndex::new(2, &store).unwrap();
//! for doc_id in store.doc_ids() {
//!     index.add_doc(doc_id).unwrap();
//! }
//!
//! let hits = index.top_k(2, &[0.1, 0.0], 2).unwrap();
//! assert_eq!(hits.doc_ids(), vec![0, 1]);
//! ```

pub mod cli;
pub mod error;
pub mod util;
pub mod vector;

pub mod prelude {
    pub use crate::error::{HalberdError, Result};
    pub use crate::vector::{
        DenseVectorStore, DocVectorAccess, FlatIndex, ForestIndex, Hit, IndexConfig, IndexKind,
        LshIndex, NearestNeighborIndex, SharedIndex, TopK, create_index,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
