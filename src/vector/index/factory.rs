//! Construction of indexes from an [`IndexConfig`].

use crate::error::Result;
use crate::vector::core::vector::DocVectorAccess;
use crate::vector::index::NearestNeighborIndex;
use crate::vector::index::config::{IndexConfig, IndexKind};
use crate::vector::index::flat::FlatIndex;
use crate::vector::index::forest::ForestIndex;
use crate::vector::index::lsh::LshIndex;

/// Build an empty index of the configured kind over `store`.
pub fn create_index<S>(config: &IndexConfig, store: S) -> Result<Box<dyn NearestNeighborIndex>>
where
    S: DocVectorAccess + 'static,
{
    config.validate()?;

    let index: Box<dyn NearestNeighborIndex> = match config.kind {
        IndexKind::Flat => Box::new(FlatIndex::new(config.dimension, store)?),
        IndexKind::Forest => Box::new(ForestIndex::with_config(
            config.dimension,
            store,
            config.forest,
        )?),
        IndexKind::Lsh => Box::new(LshIndex::with_config(config.dimension, store, config.lsh)?),
    };

    tracing::debug!(kind = index.name(), dimension = config.dimension, "created index");
    Ok(index)
}
