// crates/geores-core/src/loader/common_io.rs
use crate::error::{GeoError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "compact")]
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    Gzip,
    None,
}

impl CompressionMode {
    /// Gzip when the `compact` feature is on.
    pub fn preferred() -> Self {
        #[cfg(feature = "compact")]
        {
            CompressionMode::Gzip
        }
        #[cfg(not(feature = "compact"))]
        {
            CompressionMode::None
        }
    }
}

/// Opens a file for buffered line reading, decompressing it when it starts
/// with the gzip magic bytes.
pub fn open_stream(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| {
        GeoError::NotFound(format!("Dataset not found at {}: {}", path.display(), e))
    })?;
    let mut reader = BufReader::new(file);

    let gzipped = reader.fill_buf().map_err(GeoError::Io)?.starts_with(&GZIP_MAGIC);
    if !gzipped {
        return Ok(Box::new(reader));
    }

    #[cfg(feature = "compact")]
    {
        Ok(Box::new(BufReader::new(GzDecoder::new(reader))))
    }

    #[cfg(not(feature = "compact"))]
    {
        Err(GeoError::InvalidData(format!(
            "{} is gzipped but 'compact' is disabled",
            path.display()
        )))
    }
}

/// Creates (or truncates) a file for writing, optionally gzip-compressed.
///
/// The returned writer must be flushed; for gzip this also writes the trailer
/// once it is dropped.
pub fn create_stream(path: &Path, compression: CompressionMode) -> Result<Box<dyn Write>> {
    let file = File::create(path).map_err(GeoError::Io)?;
    let writer = BufWriter::new(file);

    match compression {
        CompressionMode::Gzip => {
            #[cfg(feature = "compact")]
            {
                Ok(Box::new(GzEncoder::new(writer, Compression::default())))
            }
            #[cfg(not(feature = "compact"))]
            {
                Err(GeoError::InvalidData(
                    "Gzip requested but 'compact' disabled".into(),
                ))
            }
        }
        CompressionMode::None => Ok(Box::new(writer)),
    }
}

/// Reads a whole stream into memory.
pub fn read_all(mut reader: impl Read) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).map_err(GeoError::Io)?;
    Ok(data)
}
