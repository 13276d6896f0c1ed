//! Command implementations for the halberd CLI.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::HalberdError;
use crate::vector::core::vector::DenseVectorStore;
use crate::vector::index::config::IndexConfig;
use crate::vector::index::factory::create_index;
use crate::vector::index::flat::FlatIndex;
use crate::vector::index::NearestNeighborIndex;
use crate::vector::io::read_fvecs_file;
use crate::vector::search::evaluation::{
    EvaluationSummary, evaluate_index, ground_truth, verify_ground_truth,
};
use crate::vector::search::quality;

/// Execute a CLI command.
pub fn execute_command(args: HalberdArgs) -> Result<()> {
    match &args.command {
        Command::Benchmark(benchmark_args) => run_benchmark(benchmark_args, &args),
        Command::Search(search_args) => run_search(search_args, &args),
    }
}

/// Base and query vectors loaded from disk.
struct Dataset {
    base: Arc<DenseVectorStore>,
    queries: DenseVectorStore,
}

fn load_dataset(args: &DataArgs) -> Result<Dataset> {
    let base = read_fvecs_file(&args.base, args.limit_docs)
        .with_context(|| format!("failed to read base vectors from {}", args.base.display()))?;
    let queries = read_fvecs_file(&args.queries, args.limit_queries).with_context(|| {
        format!("failed to read query vectors from {}", args.queries.display())
    })?;

    if base.dimension() != queries.dimension() {
        return Err(HalberdError::dimension_mismatch(base.dimension(), queries.dimension()))
            .context("base and query vectors differ in dimensionality");
    }

    tracing::info!(
        documents = base.len(),
        queries = queries.len(),
        dimension = base.dimension(),
        "loaded dataset"
    );
    Ok(Dataset {
        base: Arc::new(base),
        queries,
    })
}

/// Build an index over every base vector and return it with the build time.
fn build_index(
    config: &IndexConfig,
    base: &Arc<DenseVectorStore>,
) -> Result<(Box<dyn NearestNeighborIndex>, f64)> {
    let start = Instant::now();
    let mut index = create_index(config, Arc::clone(base))?;
    for doc_id in base.doc_ids() {
        index
            .add_doc(doc_id)
            .with_context(|| format!("failed to index document {doc_id}"))?;
    }
    let build_ms = start.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(index = index.name(), documents = index.len(), build_ms, "built index");
    Ok((index, build_ms))
}

fn build_oracle(base: &Arc<DenseVectorStore>) -> Result<FlatIndex<Arc<DenseVectorStore>>> {
    let mut oracle = FlatIndex::new(base.dimension(), Arc::clone(base))?;
    for doc_id in base.doc_ids() {
        oracle.add_doc(doc_id)?;
    }
    Ok(oracle)
}

/// Measure recall and latency of one index at several budgets.
fn run_benchmark(args: &BenchmarkArgs, cli_args: &HalberdArgs) -> Result<()> {
    if args.budgets.is_empty() {
        bail!("at least one --budget is required");
    }
    if let Some(min_recall) = args.min_recall
        && !(0.0..=1.0).contains(&min_recall)
    {
        bail!("--min-recall must be between 0 and 1, got {min_recall}");
    }
    if let Some(max_ratio) = args.max_ratio
        && (max_ratio.is_nan() || max_ratio < 1.0)
    {
        bail!("--max-ratio must be at least 1, got {max_ratio}");
    }

    let dataset = load_dataset(&args.data)?;
    let config = args.index.to_config(dataset.base.dimension())?;
    let (index, build_ms) = build_index(&config, &dataset.base)?;

    let start = Instant::now();
    let oracle = build_oracle(&dataset.base)?;
    let truth = ground_truth(&oracle, &dataset.queries, args.k)
        .context("failed to compute ground truth")?;
    let ground_truth_ms = start.elapsed().as_secs_f64() * 1000.0;

    let verification = if args.verify {
        Some(
            verify_ground_truth(&oracle, &dataset.queries, &truth)
                .context("failed to verify ground truth")?,
        )
    } else {
        None
    };

    let mut runs = Vec::with_capacity(args.budgets.len());
    for &budget in &args.budgets {
        let summary = evaluate_index(index.as_ref(), &dataset.queries, &truth, args.k, budget)
            .with_context(|| format!("evaluation failed at budget {budget}"))?;
        runs.push(summary);
    }

    let mut failures = acceptance_failures(&runs, args.min_recall, args.max_ratio);
    if let Some(check) = &verification
        && check.violations > 0
    {
        failures.push(format!(
            "{} queries have a document closer than the exact nearest hit",
            check.violations
        ));
    }

    output_result(
        "Benchmark completed",
        &BenchmarkReport {
            config,
            documents: dataset.base.len(),
            queries: dataset.queries.len(),
            k: args.k,
            build_ms,
            ground_truth_ms,
            runs,
            verification,
        },
        cli_args,
    )?;

    if !failures.is_empty() {
        bail!("acceptance check failed: {}", failures.join("; "));
    }
    Ok(())
}

/// Runs whose worst query misses the requested recall or distance ratio.
fn acceptance_failures(
    runs: &[EvaluationSummary],
    min_recall: Option<f64>,
    max_ratio: Option<f64>,
) -> Vec<String> {
    let mut failures = Vec::new();
    for run in runs {
        if let Some(min_recall) = min_recall {
            let worst = run.min_recall as f64 / run.k as f64;
            if worst < min_recall {
                failures.push(format!(
                    "budget {}: worst recall {worst:.3} below {min_recall}",
                    run.budget
                ));
            }
        }
        if let Some(max_ratio) = max_ratio
            && run.max_ratio > max_ratio
        {
            failures.push(format!(
                "budget {}: distance ratio {:.3} above {max_ratio}",
                run.budget, run.max_ratio
            ));
        }
    }
    failures
}

/// Answer a single query, optionally comparing it with the exact result.
fn run_search(args: &SearchArgs, cli_args: &HalberdArgs) -> Result<()> {
    let dataset = load_dataset(&args.data)?;
    let query = dataset.queries.vector(args.query_id).with_context(|| {
        format!(
            "query id {} out of range ({} queries loaded)",
            args.query_id,
            dataset.queries.len()
        )
    })?;

    let config = args.index.to_config(dataset.base.dimension())?;
    let (index, _) = build_index(&config, &dataset.base)?;

    let start = Instant::now();
    let hits = index.top_k(args.k, query, args.budget)?;
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    let quality = if args.exact {
        let exact = build_oracle(&dataset.base)?.brute_force(query, args.k)?;
        let max_ratio = match quality::evaluate(&exact, &hits) {
            Ok(report) => Some(report.max_ratio),
            Err(HalberdError::DegenerateQuery { .. }) => None,
            Err(err) => return Err(err.into()),
        };
        Some(SearchQuality {
            recall: quality::recall(&exact, &hits),
            max_ratio,
        })
    } else {
        None
    };

    output_result(
        "Search completed",
        &SearchReport {
            index: index.name().to_string(),
            query_id: args.query_id,
            k: args.k,
            budget: args.budget,
            duration_ms,
            hits,
            quality,
        },
        cli_args,
    )?;

    Ok(())
}
