//! Bounded best-of-K selection.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{HalberdError, Result};
use crate::vector::core::hit::{Hit, TopK};

/// Heap entry ordered by distance, then by ascending document id.
///
/// The heap top is therefore the farthest retained hit and, among equally far
/// ones, the one with the largest id.
#[derive(Debug, Clone, Copy)]
struct Retained(Hit);

impl PartialEq for Retained {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Retained {}

impl PartialOrd for Retained {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Retained {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .distance
            .total_cmp(&other.0.distance)
            .then_with(|| self.0.doc_id.cmp(&other.0.doc_id))
    }
}

/// Keeps the K closest hits out of a stream.
///
/// Backed by a max-heap whose top is the worst retained hit, so every offer
/// costs O(log K). Once full, a new hit only replaces the worst one when its
/// distance is strictly smaller: on an exact tie at the boundary the hit seen
/// first stays. Among several equally far worst hits the one with the largest
/// id is evicted.
///
/// Fed in ascending id order, the selector keeps the K smallest hits by
/// `(distance, doc_id)`. That set only improves as more candidates are fed,
/// which is what makes recall monotone in the search budget.
#[derive(Debug, Clone)]
pub struct TopKHeap {
    capacity: usize,
    heap: BinaryHeap<Retained>,
}

impl TopKHeap {
    /// Create a selector that retains at most `k` hits.
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(HalberdError::invalid_argument(
                "top-k capacity must be at least 1",
            ));
        }
        Ok(Self {
            capacity: k,
            heap: BinaryHeap::with_capacity(k),
        })
    }

    /// Offer a hit. Returns whether it was retained.
    pub fn maybe_use(&mut self, hit: Hit) -> bool {
        if self.heap.len() < self.capacity {
            self.heap.push(Retained(hit));
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut worst) if hit.distance < worst.0.distance => {
                *worst = Retained(hit);
                true
            }
            _ => false,
        }
    }

    /// The worst retained hit, i.e. the current admission threshold once full.
    pub fn worst(&self) -> Option<&Hit> {
        self.heap.peek().map(|retained| &retained.0)
    }

    /// Maximum number of retained hits.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained hits.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when nothing has been retained yet.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// True once `capacity` hits are retained.
    pub fn is_full(&self) -> bool {
        self.heap.len() == self.capacity
    }

    /// Drain the selector into a result, closest first.
    pub fn best_hits(self) -> TopK {
        TopK::from_hits(self.heap.into_iter().map(|retained| retained.0).collect())
    }
}
