//! Search hits and ordered top-K results.

use std::cmp::Ordering;
use std::ops::Index;

use serde::{Deserialize, Serialize};

/// A document together with its squared distance to some query.
///
/// Hits are totally ordered: ascending by distance, and among equal distances
/// by descending document id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hit {
    /// Externally assigned document identifier.
    pub doc_id: u32,
    /// Squared Euclidean distance to the query.
    pub distance: f64,
}

impl Hit {
    /// Create a new hit.
    pub fn new(doc_id: u32, distance: f64) -> Self {
        Self { doc_id, distance }
    }
}

impl PartialEq for Hit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Hit {}

impl PartialOrd for Hit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

/// The hits produced by one query, ascending by distance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopK {
    hits: Vec<Hit>,
}

impl TopK {
    /// Build a result from hits in any order.
    pub fn from_hits(mut hits: Vec<Hit>) -> Self {
        hits.sort_unstable();
        Self { hits }
    }

    /// Number of hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// True when the result holds no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// The hits, best first.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Iterate over the hits, best first.
    pub fn iter(&self) -> std::slice::Iter<'_, Hit> {
        self.hits.iter()
    }

    /// The document ids, best first.
    pub fn doc_ids(&self) -> Vec<u32> {
        self.hits.iter().map(|hit| hit.doc_id).collect()
    }

    /// Whether distances are non-decreasing by rank.
    pub fn is_sorted(&self) -> bool {
        self.hits
            .windows(2)
            .all(|pair| pair[0].distance <= pair[1].distance)
    }

    /// Take ownership of the hits.
    pub fn into_hits(self) -> Vec<Hit> {
        self.hits
    }
}

impl Index<usize> for TopK {
    type Output = Hit;

    fn index(&self, rank: usize) -> &Hit {
        &self.hits[rank]
    }
}

impl IntoIterator for TopK {
    type Item = Hit;
    type IntoIter = std::vec::IntoIter<Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

impl<'a> IntoIterator for &'a TopK {
    type Item = &'a Hit;
    type IntoIter = std::slice::Iter<'a, Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
