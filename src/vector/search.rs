//! Search execution shared by all index variants.
//!
//! - `top_k`: bounded best-of-K selector
//! - `scan`: exact re-ranking of candidate sets
//! - `quality`: recall and distance-ratio against the brute-force oracle
//! - `evaluation`: batch quality runs over a query set

pub mod evaluation;
pub mod quality;
pub mod scan;
pub mod top_k;
