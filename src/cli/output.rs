//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{HalberdArgs, OutputFormat};
use crate::error::Result;
use crate::vector::core::hit::TopK;
use crate::vector::index::config::IndexConfig;
use crate::vector::search::evaluation::{EvaluationSummary, GroundTruthCheck};

/// Result structure for a benchmark run.
#[derive(Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub config: IndexConfig,
    pub documents: usize,
    pub queries: usize,
    pub k: usize,
    pub build_ms: f64,
    pub ground_truth_ms: f64,
    pub runs: Vec<EvaluationSummary>,
    pub verification: Option<GroundTruthCheck>,
}

/// Result structure for a single query.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchReport {
    pub index: String,
    pub query_id: u32,
    pub k: usize,
    pub budget: usize,
    pub duration_ms: f64,
    pub hits: TopK,
    pub quality: Option<SearchQuality>,
}

/// Comparison of a single result with the exact answer.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchQuality {
    pub recall: usize,
    pub max_ratio: Option<f64>,
}

/// Results that know how to print themselves for people.
pub trait HumanOutput {
    fn print_human(&self, args: &HalberdArgs);
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &HalberdArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            result.print_human(args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &HalberdArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

impl HumanOutput for BenchmarkReport {
    fn print_human(&self, args: &HalberdArgs) {
        println!("Benchmark Results:");
        println!("══════════════════");
        println!("Index:          {}", self.config.kind.name());
        println!("Documents:      {}", self.documents);
        println!("Queries:        {}", self.queries);
        println!("Dimension:      {}", self.config.dimension);
        println!("K:              {}", self.k);
        println!("Build time:     {:.1} ms", self.build_ms);
        if args.verbosity() > 1 {
            println!("Ground truth:   {:.1} ms", self.ground_truth_ms);
        }
        println!();
        println!(
            "{:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>12}",
            "budget", "recall", "min", "max ratio", "mean ratio", "ms/query"
        );
        for run in &self.runs {
            println!(
                "{:>10}  {:>10.4}  {:>10}  {:>10.4}  {:>10.4}  {:>12.3}",
                run.budget,
                run.mean_recall,
                run.min_recall,
                run.max_ratio,
                run.mean_ratio,
                run.per_query_ms()
            );
        }
        if let Some(run) = self.runs.iter().find(|run| run.degenerate_queries > 0) {
            println!();
            println!(
                "{} queries had a zero exact distance and were left out of the ratios",
                run.degenerate_queries
            );
        }
        if let Some(check) = &self.verification {
            println!();
            println!("Ground truth violations: {}", check.violations);
            for (rank, ratio) in &check.ratio_profile {
                println!("  ratio at rank {rank:>6}: {ratio:.4}");
            }
        }
    }
}

impl HumanOutput for SearchReport {
    fn print_human(&self, _args: &HalberdArgs) {
        println!("Search Results:");
        println!("═══════════════");
        println!(
            "Query {} on {} index (k={}, budget={}) in {:.3} ms",
            self.query_id, self.index, self.k, self.budget, self.duration_ms
        );
        println!();
        for (rank, hit) in self.hits.iter().enumerate() {
            println!("{:>4}. doc {:>8}  distance {:.6}", rank + 1, hit.doc_id, hit.distance);
        }
        if let Some(quality) = &self.quality {
            println!();
            println!("Recall: {}/{}", quality.recall, self.k);
            match quality.max_ratio {
                Some(ratio) => println!("Max distance ratio: {ratio:.4}"),
                None => println!("Max distance ratio: undefined (zero exact distance)"),
            }
        }
    }
}
