//! Shared utility modules used across Halberd components.

pub mod simd;
