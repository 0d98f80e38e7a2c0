// crates/geores-core/src/util.rs
use crate::error::{GeoError, Result};

/// Splits `list` into chunks of at most `max_chunk_size` elements.
///
/// Full chunks are taken from the front while more than two chunks' worth of
/// elements remain; the remainder is split in two roughly equal halves so the
/// last chunk is never a tiny runt.
///
/// ```rust
/// use geores_core::util::chunkify_list;
///
/// let list: Vec<i32> = (1..=10).collect();
/// let chunks = chunkify_list(&list, 3).unwrap();
/// assert_eq!(chunks, vec![&[1, 2, 3][..], &[4, 5, 6][..], &[7, 8][..], &[9, 10][..]]);
/// ```
pub fn chunkify_list<T>(list: &[T], max_chunk_size: usize) -> Result<Vec<&[T]>> {
    if max_chunk_size < 1 {
        return Err(GeoError::InvalidParameter(
            "chunk size must be at least 1".to_string(),
        ));
    }

    if list.len() <= max_chunk_size {
        return Ok(vec![list]);
    }

    let mut chunks = Vec::new();
    let mut index = 0;
    while index + max_chunk_size * 2 < list.len() {
        chunks.push(&list[index..index + max_chunk_size]);
        index += max_chunk_size;
    }

    let split = index + (list.len() - index) / 2;
    chunks.push(&list[index..split]);
    chunks.push(&list[split..]);
    Ok(chunks)
}
