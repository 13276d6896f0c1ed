//! Approximate nearest-neighbor search under Euclidean distance.
//!
//! # Module Structure
//!
//! - `core`: vectors, the distance metric and ranked hits
//! - `index`: the index trait and its flat, forest and LSH variants
//! - `search`: top-K selection, exact re-ranking and quality measurement
//! - `io`: `.fvecs` ingestion

pub mod core;
pub mod index;
pub mod io;
pub mod search;

pub use self::core::distance::L2Distance;
pub use self::core::hit::{Hit, TopK};
pub use self::core::vector::{DenseVectorStore, DocVectorAccess};
pub use self::index::{
    FlatIndex, ForestIndex, IndexConfig, IndexKind, LshIndex, NearestNeighborIndex, SharedIndex,
    create_index,
};
pub use self::search::top_k::TopKHeap;
