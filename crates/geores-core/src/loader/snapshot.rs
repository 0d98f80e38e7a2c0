// crates/geores-core/src/loader/snapshot.rs

//! Binary snapshots of a [`MemoryIndex`], so large dumps are parsed once.

use log::info;
use std::io::Write;
use std::path::Path;

use super::common_io::{self, CompressionMode};
use crate::error::{GeoError, Result};
use crate::memory::MemoryIndex;

#[cfg(not(feature = "compact"))]
pub const SNAPSHOT_SUFFIX: &str = ".idx.bin";
#[cfg(feature = "compact")]
pub const SNAPSHOT_SUFFIX: &str = ".idx.bin.gz";

impl MemoryIndex {
    /// Writes the index with bincode, gzipped when `compact` is enabled.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_snapshot_with(path.as_ref(), CompressionMode::preferred())
    }

    pub fn save_snapshot_with(&self, path: &Path, compression: CompressionMode) -> Result<()> {
        let mut writer = common_io::create_stream(path, compression)?;
        bincode::serialize_into(&mut writer, self).map_err(GeoError::Bincode)?;
        writer.flush().map_err(GeoError::Io)?;
        info!("Wrote index snapshot to {} ({:?})", path.display(), compression);
        Ok(())
    }

    /// Reads a snapshot written by [`MemoryIndex::save_snapshot`]. Compression
    /// is detected from the file contents.
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = common_io::open_stream(path)?;
        let data = common_io::read_all(reader)?;
        let index: MemoryIndex = bincode::deserialize(&data).map_err(GeoError::Bincode)?;
        info!("Loaded index snapshot from {}: {:?}", path.display(), index.stats());
        Ok(index)
    }
}
