//! Command line argument parsing for the halberd CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vector::index::config::{IndexConfig, IndexKind};

/// Halberd - approximate nearest-neighbor search benchmarks
#[derive(Parser, Debug, Clone)]
#[command(name = "halberd")]
#[command(about = "Build approximate nearest-neighbor indexes and measure their quality")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct HalberdArgs {
    /// Verbosity level (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl HalberdArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build an index over a base set and measure recall for a query set
    Benchmark(BenchmarkArgs),

    /// Print the nearest neighbors of a single query
    Search(SearchArgs),
}

/// Input vector files shared by every command.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Base vectors to index (.fvecs)
    #[arg(long, value_name = "FVECS")]
    pub base: PathBuf,

    /// Query vectors (.fvecs)
    #[arg(long, value_name = "FVECS")]
    pub queries: PathBuf,

    /// Only load this many base vectors
    #[arg(long)]
    pub limit_docs: Option<usize>,

    /// Only load this many query vectors
    #[arg(long)]
    pub limit_queries: Option<usize>,
}

/// Index selection and tuning.
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Index variant (flat, forest, lsh)
    #[arg(long, value_parser = IndexKind::parse_str)]
    pub index: Option<IndexKind>,

    /// Index configuration file (JSON)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Number of trees in the forest
    #[arg(long)]
    pub trees: Option<usize>,

    /// Maximum number of documents per forest leaf
    #[arg(long)]
    pub leaf_size: Option<usize>,

    /// Number of LSH projections (signature bits)
    #[arg(long)]
    pub projections: Option<usize>,

    /// Seed for randomized index construction
    #[arg(long)]
    pub seed: Option<u64>,
}

impl IndexArgs {
    /// Combine the configuration file (if any) with command line overrides.
    pub fn to_config(&self, dimension: usize) -> Result<IndexConfig> {
        let mut config = match &self.config {
            Some(path) => IndexConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => IndexConfig::default(),
        };

        config.dimension = dimension;
        if let Some(kind) = self.index {
            config.kind = kind;
        }
        if let Some(trees) = self.trees {
            config.forest.num_trees = trees;
        }
        if let Some(leaf_size) = self.leaf_size {
            config.forest.max_leaf_size = leaf_size;
        }
        if let Some(projections) = self.projections {
            config.lsh.num_projections = projections;
        }
        if let Some(seed) = self.seed {
            config.forest.seed = seed;
            config.lsh.seed = seed;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments for benchmarking
#[derive(Parser, Debug, Clone)]
pub struct BenchmarkArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub index: IndexArgs,

    /// Number of neighbors per query
    #[arg(short, long, default_value = "100")]
    pub k: usize,

    /// Search budgets to measure
    #[arg(long = "budget", num_args = 1.., default_values_t = [1000usize, 5000, 20000])]
    pub budgets: Vec<usize>,

    /// Rescan every document to check the exact results and report distance ratio percentiles
    #[arg(long)]
    pub verify: bool,

    /// Fail unless every query reaches this recall (fraction of k) at every budget
    #[arg(long, value_name = "FRACTION")]
    pub min_recall: Option<f64>,

    /// Fail if any query's distance ratio exceeds this at any budget
    #[arg(long, value_name = "RATIO")]
    pub max_ratio: Option<f64>,
}

/// Arguments for a single query
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub index: IndexArgs,

    /// Position of the query vector in the query file
    #[arg(long)]
    pub query_id: u32,

    /// Number of neighbors to return
    #[arg(short, long, default_value = "10")]
    pub k: usize,

    /// Search budget
    #[arg(long, default_value = "1000")]
    pub budget: usize,

    /// Also run the exact search and report recall
    #[arg(long)]
    pub exact: bool,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
