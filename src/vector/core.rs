//! Core data structures for vector search.
//!
//! Distance computation, search hits and the vector storage abstraction that
//! every index is built on.

pub mod distance;
pub mod hit;
pub mod vector;
