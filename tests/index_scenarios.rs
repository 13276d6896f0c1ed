use std::sync::Arc;

use halberd::error::{HalberdError, Result};
use halberd::vector::core::vector::{DenseVectorStore, DocVectorAccess};
use halberd::vector::index::{
    FlatIndex, ForestIndex, ForestIndexConfig, IndexConfig, IndexKind, LshIndex, LshIndexConfig,
    NearestNeighborIndex, SharedIndex, create_index,
};
use halberd::vector::search::evaluation::{evaluate_index, ground_truth};
use halberd::vector::search::quality;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn clustered_store(count: usize, dimension: usize, seed: u64) -> DenseVectorStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<Vec<f32>> = (0..8)
        .map(|_| (0..dimension).map(|_| rng.random_range(-10.0..10.0)).collect())
        .collect();

    let mut store = DenseVectorStore::with_capacity(dimension, count).unwrap();
    for i in 0..count {
        let center = &centers[i % centers.len()];
        let vector: Vec<f32> = center
            .iter()
            .map(|c| c + rng.random_range(-1.0..1.0))
            .collect();
        store.push(&vector).unwrap();
    }
    store
}

fn scenario_store() -> DenseVectorStore {
    // id 0 is never indexed
    DenseVectorStore::from_vectors(
        4,
        [
            [50.0f32, 50.0, 50.0, 50.0],
            [0.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0, 0.0],
        ],
    )
    .unwrap()
}

fn all_kinds() -> [IndexKind; 3] {
    [IndexKind::Flat, IndexKind::Forest, IndexKind::Lsh]
}

#[test]
fn every_index_answers_the_small_scenario() -> Result<()> {
    let store = Arc::new(scenario_store());

    for kind in all_kinds() {
        let mut index = create_index(&IndexConfig::new(kind, 4), Arc::clone(&store))?;
        for doc_id in 1..=3 {
            index.add_doc(doc_id)?;
        }

        let hits = index.top_k(2, &[0.0; 4], 3)?;
        assert_eq!(hits.len(), 2, "{}", kind.name());
        assert_eq!(hits[0].doc_id, 1);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[1].doc_id, 2);
        assert_eq!(hits[1].distance, 1.0);
    }
    Ok(())
}

#[test]
fn empty_index_reports_insufficient_data() -> Result<()> {
    let store = Arc::new(scenario_store());

    for kind in all_kinds() {
        let index = create_index(&IndexConfig::new(kind, 4), Arc::clone(&store))?;
        let err = index.top_k(1, &[0.0; 4], 1).unwrap_err();
        assert!(
            matches!(
                err,
                HalberdError::InsufficientData {
                    requested: 1,
                    available: 0
                }
            ),
            "{}: {err}",
            kind.name()
        );
    }
    Ok(())
}

#[test]
fn zero_k_is_rejected() -> Result<()> {
    let store = Arc::new(scenario_store());

    for kind in all_kinds() {
        let mut index = create_index(&IndexConfig::new(kind, 4), Arc::clone(&store))?;
        index.add_doc(1)?;
        let err = index.top_k(0, &[0.0; 4], 10).unwrap_err();
        assert!(matches!(err, HalberdError::InvalidArgument(_)));
    }
    Ok(())
}

#[test]
fn full_budget_reproduces_brute_force() -> Result<()> {
    let store = clustered_store(600, 12, 7);
    let queries = clustered_store(20, 12, 8);

    let mut flat = FlatIndex::new(12, &store)?;
    let mut forest = ForestIndex::with_config(
        12,
        &store,
        ForestIndexConfig {
            num_trees: 3,
            max_leaf_size: 16,
            ..ForestIndexConfig::default()
        },
    )?;
    let mut lsh = LshIndex::with_config(
        12,
        &store,
        LshIndexConfig {
            num_projections: 20,
            ..LshIndexConfig::default()
        },
    )?;
    for doc_id in store.doc_ids() {
        flat.add_doc(doc_id)?;
        forest.add_doc(doc_id)?;
        lsh.add_doc(doc_id)?;
    }

    for query_id in queries.doc_ids() {
        let query = queries.get(query_id);
        let exact = flat.brute_force(query, 15)?;
        assert_eq!(forest.top_k(15, query, store.len())?, exact);
        assert_eq!(lsh.top_k(15, query, store.len())?, exact);
    }
    Ok(())
}

#[test]
fn recall_never_drops_as_budget_grows() -> Result<()> {
    let store = clustered_store(1000, 16, 11);
    let queries = clustered_store(25, 16, 12);

    let mut flat = FlatIndex::new(16, &store)?;
    let mut forest = ForestIndex::new(16, &store)?;
    let mut lsh = LshIndex::new(16, &store)?;
    for doc_id in store.doc_ids() {
        flat.add_doc(doc_id)?;
        forest.add_doc(doc_id)?;
        lsh.add_doc(doc_id)?;
    }

    let budgets = [10, 20, 50, 100, 250, 500, 1000];
    for query_id in queries.doc_ids() {
        let query = queries.get(query_id);
        let exact = flat.brute_force(query, 10)?;

        let approximate: [&dyn NearestNeighborIndex; 2] = [&forest, &lsh];
        for index in approximate {
            let mut previous = 0;
            for budget in budgets {
                let recall = quality::recall(&exact, &index.top_k(10, query, budget)?);
                assert!(
                    recall >= previous,
                    "{} recall fell from {previous} to {recall} at budget {budget}",
                    index.name()
                );
                previous = recall;
            }
            assert_eq!(previous, 10);
        }
    }
    Ok(())
}

#[test]
fn brute_force_finds_itself() -> Result<()> {
    let store = clustered_store(300, 8, 3);
    let mut flat = FlatIndex::new(8, &store)?;
    for doc_id in store.doc_ids() {
        flat.add_doc(doc_id)?;
    }

    for doc_id in [0, 42, 299] {
        let query = store.get(doc_id);
        let hits = flat.brute_force(query, 5)?;
        assert_eq!(quality::recall(&hits, &hits), 5);
        assert_eq!(hits[0].doc_id, doc_id);
        assert_eq!(hits[0].distance, 0.0);
        assert!(hits.is_sorted());
    }
    Ok(())
}

#[test]
fn batch_evaluation_over_every_variant() -> Result<()> {
    let store = Arc::new(clustered_store(400, 10, 21));
    let queries = clustered_store(30, 10, 22);

    let mut oracle = FlatIndex::new(10, Arc::clone(&store))?;
    for doc_id in store.doc_ids() {
        oracle.add_doc(doc_id)?;
    }
    let truth = ground_truth(&oracle, &queries, 10)?;

    for kind in all_kinds() {
        let mut index = create_index(&IndexConfig::new(kind, 10), Arc::clone(&store))?;
        for doc_id in store.doc_ids() {
            index.add_doc(doc_id)?;
        }

        let full = evaluate_index(index.as_ref(), &queries, &truth, 10, store.len())?;
        assert_eq!(full.mean_recall, 1.0, "{}", kind.name());
        assert_eq!(full.min_recall, 10);
        assert_eq!(full.max_ratio, 1.0);

        let narrow = evaluate_index(index.as_ref(), &queries, &truth, 10, 10)?;
        assert!(narrow.mean_recall <= full.mean_recall);
        assert!(narrow.max_ratio >= 1.0);
    }
    Ok(())
}

#[test]
fn shared_index_serves_readers_while_writing() -> Result<()> {
    let store = Arc::new(clustered_store(200, 6, 5));
    let shared = SharedIndex::new(ForestIndex::new(6, Arc::clone(&store))?);
    shared.add_doc(0)?;

    std::thread::scope(|scope| {
        let writer = shared.clone();
        scope.spawn(move || {
            for doc_id in 1..200 {
                writer.add_doc(doc_id).unwrap();
            }
        });

        for _ in 0..2 {
            let reader = shared.clone();
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for _ in 0..50 {
                    let hits = reader.top_k(1, store.get(0), 8).unwrap();
                    assert_eq!(hits[0].doc_id, 0);
                }
            });
        }
    });

    assert_eq!(shared.len(), 200);
    Ok(())
}
