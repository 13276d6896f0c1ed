use halberd::vector::core::distance::L2Distance;
use halberd::vector::core::hit::{Hit, TopK};
use halberd::vector::core::vector::DenseVectorStore;
use halberd::vector::index::{FlatIndex, NearestNeighborIndex};
use halberd::vector::search::quality;
use halberd::vector::search::scan::exact_top_k;
use halberd::vector::search::top_k::TopKHeap;
use proptest::prelude::*;

const DIMENSION: usize = 6;

// Strategy: vectors with small integer-valued components, so distances are exact
fn arb_vector() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec((-20i32..20).prop_map(|x| x as f32), DIMENSION)
}

fn arb_vectors() -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec(arb_vector(), 1..60)
}

// Hits with pairwise distinct distances
fn arb_distinct_hits() -> impl Strategy<Value = Vec<Hit>> {
    prop::collection::btree_set(0u32..100_000, 1..200)
        .prop_map(|keys| {
            keys.into_iter()
                .enumerate()
                .map(|(doc_id, key)| Hit::new(doc_id as u32, f64::from(key) * 0.25))
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

fn select(hits: &[Hit], k: usize) -> TopK {
    let mut heap = TopKHeap::new(k).unwrap();
    for hit in hits {
        heap.maybe_use(*hit);
    }
    heap.best_hits()
}

proptest! {
    #[test]
    fn prop_selector_equals_sort_and_truncate(hits in arb_distinct_hits(), k in 1usize..50) {
        let mut sorted = hits.clone();
        sorted.sort();
        sorted.truncate(k);

        let selected = select(&hits, k);
        prop_assert!(selected.is_sorted());
        prop_assert_eq!(selected.into_hits(), sorted);
    }

    #[test]
    fn prop_selector_ignores_feed_order(hits in arb_distinct_hits(), k in 1usize..50) {
        let mut reversed = hits.clone();
        reversed.reverse();
        prop_assert_eq!(select(&hits, k), select(&reversed, k));
    }

    #[test]
    fn prop_distance_symmetric_and_zero_on_self(a in arb_vector(), b in arb_vector()) {
        let metric = L2Distance::new(DIMENSION);
        let mut scratch = metric.scratch();

        let ab = metric.distance(&a, &b, &mut scratch).unwrap();
        let ba = metric.distance(&b, &a, &mut scratch).unwrap();
        prop_assert_eq!(ab, ba);
        prop_assert!(ab >= 0.0);
        prop_assert_eq!(metric.distance(&a, &a, &mut scratch).unwrap(), 0.0);
    }

    #[test]
    fn prop_brute_force_ignores_insertion_order(
        vectors in arb_vectors(),
        query in arb_vector(),
        k in 1usize..10,
    ) {
        let store = DenseVectorStore::from_vectors(DIMENSION, &vectors).unwrap();
        let k = k.min(store.len());

        let mut forward = FlatIndex::new(DIMENSION, &store).unwrap();
        let mut backward = FlatIndex::new(DIMENSION, &store).unwrap();
        for doc_id in store.doc_ids() {
            forward.add_doc(doc_id).unwrap();
        }
        for doc_id in store.doc_ids().rev() {
            backward.add_doc(doc_id).unwrap();
        }

        let expected = forward.brute_force(&query, k).unwrap();
        prop_assert!(expected.is_sorted());
        prop_assert_eq!(expected.len(), k);
        prop_assert_eq!(backward.brute_force(&query, k).unwrap(), expected);
    }

    #[test]
    fn prop_self_recall_is_k(vectors in arb_vectors(), query in arb_vector(), k in 1usize..10) {
        let store = DenseVectorStore::from_vectors(DIMENSION, &vectors).unwrap();
        let k = k.min(store.len());

        let mut index = FlatIndex::new(DIMENSION, &store).unwrap();
        for doc_id in store.doc_ids() {
            index.add_doc(doc_id).unwrap();
        }

        let hits = index.top_k(k, &query, k).unwrap();
        prop_assert_eq!(quality::recall(&hits, &hits), k);
        prop_assert!(quality::evaluate(&hits, &hits).map_or(true, |report| report.is_exact()));
    }
}

// Strategy: hits whose distances come from a handful of integers, so ties are common
fn arb_tied_hits() -> impl Strategy<Value = Vec<Hit>> {
    prop::collection::vec(0u8..4, 1..80).prop_map(|distances| {
        distances
            .into_iter()
            .enumerate()
            .map(|(doc_id, distance)| Hit::new(doc_id as u32, f64::from(distance)))
            .collect()
    })
}

// Strategy: one-dimensional points on a short integer grid, each tagged with the
// first of three nested candidate sets it belongs to
fn arb_tied_points() -> impl Strategy<Value = Vec<(f32, u8)>> {
    prop::collection::vec(((-3i32..=3).prop_map(|x| x as f32), 0u8..3), 1..60)
}

proptest! {
    #[test]
    fn prop_ascending_feed_keeps_smallest_by_distance_then_id(
        hits in arb_tied_hits(),
        k in 1usize..20,
    ) {
        let mut expected = hits.clone();
        expected.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.doc_id.cmp(&b.doc_id)));
        expected.truncate(k);

        prop_assert_eq!(select(&hits, k), TopK::from_hits(expected));
    }

    #[test]
    fn prop_tied_selection_distances_ignore_feed_order(
        hits in arb_tied_hits().prop_shuffle(),
        k in 1usize..20,
    ) {
        let mut ascending = hits.clone();
        ascending.sort_by_key(|hit| hit.doc_id);

        let distances = |top: TopK| top.iter().map(|hit| hit.distance).collect::<Vec<_>>();
        prop_assert_eq!(distances(select(&hits, k)), distances(select(&ascending, k)));
    }

    #[test]
    fn prop_more_candidates_never_lower_recall(
        points in arb_tied_points(),
        query in -3i32..=3,
        k in 1usize..8,
    ) {
        let store = DenseVectorStore::from_vectors(1, points.iter().map(|&(x, _)| [x])).unwrap();
        let metric = L2Distance::new(1);
        let query = [query as f32];
        let k = k.min(store.len());

        let all: Vec<u32> = store.doc_ids().collect();
        let oracle = exact_top_k(&metric, &store, &query, all.iter().copied(), k).unwrap();

        let mut previous = 0;
        for level in 0..3u8 {
            let candidates = all.iter().copied().filter(|&id| points[id as usize].1 <= level);
            let found = exact_top_k(&metric, &store, &query, candidates, k).unwrap();
            let recall = quality::recall(&oracle, &found);
            prop_assert!(recall >= previous, "recall fell from {} to {}", previous, recall);
            previous = recall;
        }
        prop_assert_eq!(previous, k);
    }
}
