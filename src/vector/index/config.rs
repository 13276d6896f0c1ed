//! Configuration types for vector indexes.

use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};

/// Available index variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Exhaustive scan (exact).
    Flat,
    /// Random-projection tree forest.
    #[default]
    Forest,
    /// Sign-hash buckets over random projections.
    Lsh,
}

impl IndexKind {
    /// Get the name of this index kind.
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::Flat => "flat",
            IndexKind::Forest => "forest",
            IndexKind::Lsh => "lsh",
        }
    }

    /// Parse an index kind from a string.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "flat" | "brute_force" | "bruteforce" => Ok(IndexKind::Flat),
            "forest" | "annoy" | "trees" => Ok(IndexKind::Forest),
            "lsh" | "rplsh" | "hash" => Ok(IndexKind::Lsh),
            _ => Err(HalberdError::invalid_argument(format!(
                "Unknown index kind: {s}"
            ))),
        }
    }
}

/// Parameters of the random-projection forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestIndexConfig {
    /// Number of independently built trees.
    pub num_trees: usize,
    /// A leaf holding more documents than this is split.
    pub max_leaf_size: usize,
    /// Seed for pivot selection and tie-breaking coin flips.
    pub seed: u64,
}

impl Default for ForestIndexConfig {
    fn default() -> Self {
        Self {
            num_trees: 10,
            max_leaf_size: 128,
            seed: 0x5eed_f0e5,
        }
    }
}

impl ForestIndexConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(HalberdError::invalid_argument(
                "forest needs at least one tree",
            ));
        }
        if self.max_leaf_size < 2 {
            return Err(HalberdError::invalid_argument(
                "max_leaf_size must be at least 2",
            ));
        }
        Ok(())
    }
}

/// Parameters of the hash-bucket index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LshIndexConfig {
    /// Number of random projections, one signature bit each (1..=64).
    pub num_projections: usize,
    /// Seed for the projection vectors.
    pub seed: u64,
}

impl Default for LshIndexConfig {
    fn default() -> Self {
        Self {
            num_projections: 16,
            seed: 0x1a5b_0c4e,
        }
    }
}

impl LshIndexConfig {
    /// Largest supported signature width.
    pub const MAX_PROJECTIONS: usize = 64;

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.num_projections == 0 || self.num_projections > Self::MAX_PROJECTIONS {
            return Err(HalberdError::invalid_argument(format!(
                "num_projections must be between 1 and {}, got {}",
                Self::MAX_PROJECTIONS,
                self.num_projections
            )));
        }
        Ok(())
    }
}

/// Full description of an index to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Which variant to build.
    pub kind: IndexKind,
    /// Vector dimensionality.
    pub dimension: usize,
    /// Forest parameters, used when `kind` is `Forest`.
    pub forest: ForestIndexConfig,
    /// Hash-bucket parameters, used when `kind` is `Lsh`.
    pub lsh: LshIndexConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            kind: IndexKind::default(),
            dimension: 128,
            forest: ForestIndexConfig::default(),
            lsh: LshIndexConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Default configuration of the given kind and dimensionality.
    pub fn new(kind: IndexKind, dimension: usize) -> Self {
        Self {
            kind,
            dimension,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize this configuration as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the parameters relevant to `kind`.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(HalberdError::invalid_argument(
                "index dimensionality must be at least 1",
            ));
        }
        match self.kind {
            IndexKind::Flat => Ok(()),
            IndexKind::Forest => self.forest.validate(),
            IndexKind::Lsh => self.lsh.validate(),
        }
    }
}
