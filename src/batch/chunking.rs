//! Fixed-size chunk planning.

use crate::batch::BatchError;

/// Most transactions a single batch run may plan.
pub const MAX_CHUNKS: u64 = 100_000;

/// Split `total` units into chunks of at most `chunk_size`.
///
/// Returns ⌈total / chunk_size⌉ sizes, all full except possibly the last,
/// summing to `total`. Plans longer than [`MAX_CHUNKS`] are rejected.
pub fn chunk_counts(total: u64, chunk_size: u64) -> Result<Vec<u64>, BatchError> {
    if chunk_size == 0 {
        return Err(BatchError::ZeroChunkSize);
    }

    let count = total.div_ceil(chunk_size);
    if count > MAX_CHUNKS {
        return Err(BatchError::TooManyChunks {
            chunks: count,
            max: MAX_CHUNKS,
        });
    }

    let mut chunks = Vec::with_capacity(count as usize);
    let mut left = total;
    while left > 0 {
        let amount = left.min(chunk_size);
        chunks.push(amount);
        left -= amount;
    }
    Ok(chunks)
}

/// Split records into consecutive groups of at most `chunk_size`, keeping order.
pub fn chunk_records<T: Clone>(records: &[T], chunk_size: usize) -> Result<Vec<Vec<T>>, BatchError> {
    if chunk_size == 0 {
        return Err(BatchError::ZeroChunkSize);
    }
    Ok(records.chunks(chunk_size).map(|c| c.to_vec()).collect())
}
