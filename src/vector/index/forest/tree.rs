//! One random-projection tree, stored as a flat node arena.

use rand::Rng;
use rand::rngs::StdRng;

use crate::vector::core::distance::L2Distance;
use crate::vector::core::vector::DocVectorAccess;

/// How many pivot pairs to try before leaving an oversized leaf as is.
const SPLIT_ATTEMPTS: usize = 5;

/// Splitting hyperplane `{v : normal · v = offset}`.
#[derive(Debug, Clone)]
pub(crate) struct Hyperplane {
    normal: Vec<f32>,
    offset: f32,
}

impl Hyperplane {
    /// The perpendicular bisector of `a` and `b`, with a unit normal.
    ///
    /// Identical pivots give a zero normal, so every margin is zero.
    fn bisecting(metric: &L2Distance, a: &[f32], b: &[f32]) -> Self {
        let mut normal: Vec<f32> = a.iter().zip(b.iter()).map(|(x, y)| x - y).collect();
        let norm = metric.dot_product(&normal, &normal).sqrt();
        if norm > 0.0 {
            normal.iter_mut().for_each(|x| *x /= norm);
        }
        let midpoint: Vec<f32> = a.iter().zip(b.iter()).map(|(x, y)| (x + y) * 0.5).collect();
        let offset = metric.dot_product(&normal, &midpoint);
        Self { normal, offset }
    }

    /// Signed Euclidean distance from the plane; positive means the right side.
    #[inline]
    pub(crate) fn margin(&self, metric: &L2Distance, vector: &[f32]) -> f32 {
        metric.dot_product(&self.normal, vector) - self.offset
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf {
        members: Vec<u32>,
    },
    Split {
        plane: Hyperplane,
        left: u32,
        right: u32,
    },
}

/// Side of a hyperplane. Points exactly on it go either way at random.
fn goes_right(margin: f32, rng: &mut StdRng) -> bool {
    if margin > 0.0 {
        true
    } else if margin < 0.0 {
        false
    } else {
        rng.random_bool(0.5)
    }
}

/// Shared inputs for growing a tree.
pub(crate) struct Splitter<'a, S: ?Sized> {
    pub(crate) metric: &'a L2Distance,
    pub(crate) store: &'a S,
    pub(crate) max_leaf_size: usize,
}

/// Binary space-partitioning tree. `nodes[0]` is the root.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::Leaf {
                members: Vec::new(),
            }],
        }
    }

    /// Build a tree over `members` in one go.
    pub(crate) fn build<S>(members: Vec<u32>, splitter: &Splitter<'_, S>, rng: &mut StdRng) -> Self
    where
        S: DocVectorAccess + ?Sized,
    {
        let mut tree = Self {
            nodes: vec![Node::Leaf { members }],
        };
        tree.split_oversized(0, splitter, rng);
        tree
    }

    pub(crate) fn root(&self) -> u32 {
        0
    }

    pub(crate) fn node(&self, index: u32) -> &Node {
        &self.nodes[index as usize]
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Push `doc_id` down to its leaf, splitting the leaf if it overflows.
    pub(crate) fn insert<S>(
        &mut self,
        doc_id: u32,
        vector: &[f32],
        splitter: &Splitter<'_, S>,
        rng: &mut StdRng,
    ) where
        S: DocVectorAccess + ?Sized,
    {
        let mut index = self.root();
        loop {
            match &mut self.nodes[index as usize] {
                Node::Split { plane, left, right } => {
                    let margin = plane.margin(splitter.metric, vector);
                    index = if goes_right(margin, rng) { *right } else { *left };
                }
                Node::Leaf { members } => {
                    members.push(doc_id);
                    if members.len() <= splitter.max_leaf_size {
                        return;
                    }
                    break;
                }
            }
        }
        self.split_oversized(index, splitter, rng);
    }

    /// Split the leaf at `start` and any resulting children until every leaf
    /// fits, or no pivot pair separates a leaf's members.
    fn split_oversized<S>(&mut self, start: u32, splitter: &Splitter<'_, S>, rng: &mut StdRng)
    where
        S: DocVectorAccess + ?Sized,
    {
        let mut pending = vec![start];
        while let Some(index) = pending.pop() {
            let members = match &mut self.nodes[index as usize] {
                Node::Leaf { members } if members.len() > splitter.max_leaf_size => {
                    std::mem::take(members)
                }
                _ => continue,
            };

            match partition(&members, splitter, rng) {
                Some((plane, left_members, right_members)) => {
                    let left = self.push_leaf(left_members);
                    let right = self.push_leaf(right_members);
                    self.nodes[index as usize] = Node::Split { plane, left, right };
                    pending.push(left);
                    pending.push(right);
                }
                None => {
                    tracing::trace!(size = members.len(), "leaf could not be split");
                    self.nodes[index as usize] = Node::Leaf { members };
                }
            }
        }
    }

    fn push_leaf(&mut self, members: Vec<u32>) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(Node::Leaf { members });
        index
    }
}

/// Pick two random members, bisect them, and split `members` by side.
///
/// Returns `None` when every attempt leaves one side empty.
fn partition<S>(
    members: &[u32],
    splitter: &Splitter<'_, S>,
    rng: &mut StdRng,
) -> Option<(Hyperplane, Vec<u32>, Vec<u32>)>
where
    S: DocVectorAccess + ?Sized,
{
    if members.len() < 2 {
        return None;
    }

    for _ in 0..SPLIT_ATTEMPTS {
        let first = rng.random_range(0..members.len());
        let mut second = rng.random_range(0..members.len() - 1);
        if second >= first {
            second += 1;
        }

        let plane = Hyperplane::bisecting(
            splitter.metric,
            splitter.store.get(members[first]),
            splitter.store.get(members[second]),
        );

        let mut left = Vec::with_capacity(members.len() / 2);
        let mut right = Vec::with_capacity(members.len() / 2);
        for &doc_id in members {
            let margin = plane.margin(splitter.metric, splitter.store.get(doc_id));
            if goes_right(margin, rng) {
                right.push(doc_id);
            } else {
                left.push(doc_id);
            }
        }

        if !left.is_empty() && !right.is_empty() {
            return Some((plane, left, right));
        }
    }

    None
}
