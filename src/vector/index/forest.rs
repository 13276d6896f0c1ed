//! Random-projection forest index.
//!
//! Each tree recursively splits the indexed documents by the perpendicular
//! bisector of two randomly chosen members until leaves are small. Trees are
//! grown incrementally: a new document is pushed down every tree and a leaf
//! that overflows is split on the spot.
//!
//! A query walks all trees best-first. Nodes wait in one priority queue keyed
//! by the smallest signed distance to a hyperplane seen on the path from the
//! root; normals have unit length, so priorities compare across nodes and
//! trees. Subtrees on the query's side of every hyperplane come first and
//! subtrees just across a hyperplane come next. Leaf members are collected
//! until the search budget is reached, then ranked exactly.

mod tree;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashSet;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::Result;
use crate::vector::core::distance::L2Distance;
use crate::vector::core::hit::TopK;
use crate::vector::core::vector::DocVectorAccess;
use crate::vector::index::config::ForestIndexConfig;
use crate::vector::index::{NearestNeighborIndex, validate_dimension, validate_doc_vector, validate_query};
use crate::vector::search::scan;

use self::tree::{Node, Splitter, Tree};

/// A node waiting to be visited during a query.
#[derive(Debug, Clone, Copy)]
struct PendingNode {
    priority: f32,
    tree: u32,
    node: u32,
}

impl PartialEq for PendingNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingNode {}

impl PartialOrd for PendingNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingNode {
    // max-heap on priority; lower (tree, node) first on ties
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.tree.cmp(&self.tree))
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Approximate index over a forest of random hyperplane trees.
#[derive(Debug)]
pub struct ForestIndex<S> {
    config: ForestIndexConfig,
    metric: L2Distance,
    store: S,
    trees: Vec<Tree>,
    doc_ids: AHashSet<u32>,
    rng: StdRng,
}

impl<S: DocVectorAccess> ForestIndex<S> {
    /// Create an empty forest with default parameters.
    pub fn new(dimension: usize, store: S) -> Result<Self> {
        Self::with_config(dimension, store, ForestIndexConfig::default())
    }

    /// Create an empty forest.
    pub fn with_config(dimension: usize, store: S, config: ForestIndexConfig) -> Result<Self> {
        validate_dimension(dimension)?;
        config.validate()?;
        tracing::debug!(
            dimension,
            num_trees = config.num_trees,
            max_leaf_size = config.max_leaf_size,
            "creating forest index"
        );

        Ok(Self {
            metric: L2Distance::new(dimension),
            store,
            trees: (0..config.num_trees).map(|_| Tree::new()).collect(),
            doc_ids: AHashSet::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
        })
    }

    /// The parameters this forest was built with.
    pub fn config(&self) -> &ForestIndexConfig {
        &self.config
    }

    /// Total number of leaves over all trees.
    pub fn leaf_count(&self) -> usize {
        self.trees.iter().map(Tree::leaf_count).sum()
    }

    /// Regrow every tree from scratch over the currently indexed documents.
    ///
    /// Incremental growth picks early pivots from whatever few documents
    /// existed at the time; rebuilding once the data set is loaded gives
    /// better balanced trees.
    pub fn rebuild(&mut self) {
        let mut members: Vec<u32> = self.doc_ids.iter().copied().collect();
        members.sort_unstable();

        let splitter = Splitter {
            metric: &self.metric,
            store: &self.store,
            max_leaf_size: self.config.max_leaf_size,
        };
        let rng = &mut self.rng;
        self.trees = (0..self.config.num_trees)
            .map(|_| Tree::build(members.clone(), &splitter, rng))
            .collect();

        tracing::debug!(
            documents = members.len(),
            leaves = self.trees.iter().map(Tree::leaf_count).sum::<usize>(),
            "rebuilt forest index"
        );
    }

    /// Gather at least `budget` distinct candidates (or all documents),
    /// returned in ascending id order.
    fn collect_candidates(&self, query: &[f32], budget: usize) -> Vec<u32> {
        let mut queue = BinaryHeap::with_capacity(self.trees.len() * 4);
        for (tree_index, tree) in self.trees.iter().enumerate() {
            queue.push(PendingNode {
                priority: f32::INFINITY,
                tree: tree_index as u32,
                node: tree.root(),
            });
        }

        let mut seen = AHashSet::with_capacity(budget);
        let mut candidates = Vec::with_capacity(budget);
        let mut visited_leaves = 0usize;

        while candidates.len() < budget {
            let Some(pending) = queue.pop() else {
                break;
            };

            match self.trees[pending.tree as usize].node(pending.node) {
                Node::Leaf { members } => {
                    visited_leaves += 1;
                    for &doc_id in members {
                        if seen.insert(doc_id) {
                            candidates.push(doc_id);
                        }
                    }
                }
                Node::Split { plane, left, right } => {
                    let margin = plane.margin(&self.metric, query);
                    queue.push(PendingNode {
                        priority: pending.priority.min(margin),
                        tree: pending.tree,
                        node: *right,
                    });
                    queue.push(PendingNode {
                        priority: pending.priority.min(-margin),
                        tree: pending.tree,
                        node: *left,
                    });
                }
            }
        }

        tracing::trace!(
            budget,
            candidates = candidates.len(),
            visited_leaves,
            "forest candidates collected"
        );

        candidates.sort_unstable();
        candidates
    }
}

impl<S: DocVectorAccess> NearestNeighborIndex for ForestIndex<S> {
    fn name(&self) -> &'static str {
        "forest"
    }

    fn dimension(&self) -> usize {
        self.metric.dimension()
    }

    fn len(&self) -> usize {
        self.doc_ids.len()
    }

    fn add_doc(&mut self, doc_id: u32) -> Result<()> {
        let vector = self.store.get(doc_id);
        validate_doc_vector(&self.metric, doc_id, vector)?;
        if !self.doc_ids.insert(doc_id) {
            return Ok(());
        }

        let splitter = Splitter {
            metric: &self.metric,
            store: &self.store,
            max_leaf_size: self.config.max_leaf_size,
        };
        for tree in &mut self.trees {
            tree.insert(doc_id, vector, &splitter, &mut self.rng);
        }
        Ok(())
    }

    fn top_k(&self, k: usize, query: &[f32], budget: usize) -> Result<TopK> {
        validate_query(&self.metric, k, query, budget, self.doc_ids.len())?;
        let candidates = self.collect_candidates(query, budget);
        scan::exact_top_k(&self.metric, &self.store, query, candidates, k)
    }
}
