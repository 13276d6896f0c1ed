//! Reading and writing `.fvecs` vector files.
//!
//! Each record is a little-endian `i32` dimension followed by that many
//! little-endian `f32` components. Every record in a file must share the
//! dimension of the first one.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{HalberdError, Result};
use crate::vector::core::vector::DenseVectorStore;

/// Load at most `limit` records (all of them when `None`) from `reader`.
///
/// An empty input yields an error, since the dimension cannot be known.
pub fn read_fvecs<R: Read>(reader: R, limit: Option<usize>) -> Result<DenseVectorStore> {
    let mut reader = reader;
    let mut store: Option<DenseVectorStore> = None;
    let mut buffer = Vec::new();

    while limit.is_none_or(|limit| store.as_ref().map_or(0, |s| s.len()) < limit) {
        let dimension = match reader.read_i32::<LittleEndian>() {
            Ok(dimension) => dimension,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        };
        let dimension = usize::try_from(dimension)
            .ok()
            .filter(|&d| d > 0)
            .ok_or_else(|| {
                HalberdError::invalid_argument(format!("invalid record dimension {dimension}"))
            })?;

        let store = match &mut store {
            Some(store) => store,
            None => store.insert(DenseVectorStore::new(dimension)?),
        };
        if dimension != store.dimension() {
            return Err(HalberdError::dimension_mismatch(store.dimension(), dimension));
        }

        buffer.resize(dimension, 0.0);
        reader.read_f32_into::<LittleEndian>(&mut buffer)?;
        store.push(&buffer)?;
    }

    let store = store.ok_or_else(|| HalberdError::invalid_argument("no vectors in input"))?;
    tracing::debug!(
        vectors = store.len(),
        dimension = store.dimension(),
        "loaded fvecs"
    );
    Ok(store)
}

/// Open `path` and load it with [`read_fvecs`].
pub fn read_fvecs_file<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<DenseVectorStore> {
    let file = File::open(path.as_ref())?;
    read_fvecs(BufReader::new(file), limit)
}

/// Write every vector of `store` as an `.fvecs` record.
pub fn write_fvecs<W: Write>(writer: W, store: &DenseVectorStore) -> Result<()> {
    if store.dimension() == 0 {
        return Err(HalberdError::invalid_argument("cannot write zero-dimensional vectors"));
    }
    let mut writer = BufWriter::new(writer);
    let dimension = i32::try_from(store.dimension())
        .map_err(|_| HalberdError::invalid_argument("dimension does not fit in an i32"))?;

    for vector in store.as_slice().chunks_exact(store.dimension()) {
        writer.write_i32::<LittleEndian>(dimension)?;
        for &value in vector {
            writer.write_f32::<LittleEndian>(value)?;
        }
    }
    writer.flush()?;
    Ok(())
}
